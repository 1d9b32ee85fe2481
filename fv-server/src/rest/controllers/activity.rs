use super::ideas::require_user_id;
use crate::error::{ApiQuery, ApiResult};
use axum::{Json, extract::State};
use fv_core::ActivityLog;
use fv_store::Database;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct ActivityController {
    database: Database,
}

impl ActivityController {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub user_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub activities: Vec<ActivityLog>,
}

pub async fn list_activity(
    State(controller): State<ActivityController>,
    ApiQuery(query): ApiQuery<ActivityQuery>,
) -> ApiResult<Json<ActivityResponse>> {
    let user_id = require_user_id(query.user_id.as_deref())?;
    let activities = controller.database.list_activity(user_id, query.limit).await?;
    Ok(Json(ActivityResponse { activities }))
}
