use crate::error::ApiResult;
use axum::{
    Json,
    extract::{Path, State},
};
use fv_core::FvError;
use fv_store::{Database, SharedIdea};

#[derive(Clone)]
pub struct ShareController {
    database: Database,
}

impl ShareController {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

/// Public report lookup. The token is the only credential.
pub async fn get_shared(
    State(controller): State<ShareController>,
    Path(token): Path<String>,
) -> ApiResult<Json<SharedIdea>> {
    let shared = controller
        .database
        .get_shared_idea(&token)
        .await?
        .ok_or_else(|| FvError::not_found("Shared report"))?;
    Ok(Json(shared))
}
