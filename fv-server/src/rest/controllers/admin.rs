use crate::ServerConfig;
use crate::auth::Caller;
use crate::error::ApiResult;
use axum::{Json, extract::State};
use fv_core::FvError;
use fv_store::{AdminIdeaRow, AdminStats};
use fv_telemetry::warn;
use serde::Serialize;

#[derive(Clone)]
pub struct AdminController {
    config: ServerConfig,
}

impl AdminController {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    fn ensure_admin(&self, caller: &Caller) -> Result<(), FvError> {
        if self.config.is_admin(&caller.email) {
            Ok(())
        } else {
            warn!(email = %caller.email, "non-admin requested admin report");
            Err(FvError::Forbidden)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminIdeasResponse {
    pub ideas: Vec<AdminIdeaRow>,
    pub stats: AdminStats,
}

pub async fn list_ideas(
    State(controller): State<AdminController>,
    caller: Caller,
) -> ApiResult<Json<AdminIdeasResponse>> {
    controller.ensure_admin(&caller)?;
    let database = &controller.config.database;
    let ideas = database.list_all_ideas().await?;
    let stats = database.admin_stats().await?;
    Ok(Json(AdminIdeasResponse { ideas, stats }))
}
