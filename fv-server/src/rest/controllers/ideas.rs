use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use fv_core::{EntityType, FvError, Idea, IdeaFields, NewActivity};
use fv_store::{Database, IdeaWithReport};
use fv_telemetry::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Clone)]
pub struct IdeasController {
    database: Database,
}

impl IdeasController {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

pub(crate) fn require_user_id(user_id: Option<&str>) -> ApiResult<&str> {
    user_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::validation("user_id is required"))
}

/// Draft autosave payload. With `id` the existing draft is replaced; without it a new draft is
/// created.
#[derive(Debug, Deserialize)]
pub struct SaveDraftRequest {
    pub user_id: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: IdeaFields,
}

#[derive(Debug, Serialize)]
pub struct IdeaResponse {
    pub idea: Idea,
}

#[derive(Debug, Serialize)]
pub struct IdeasResponse {
    pub ideas: Vec<IdeaWithReport>,
}

pub async fn list_ideas(
    State(controller): State<IdeasController>,
    ApiQuery(query): ApiQuery<UserIdQuery>,
) -> ApiResult<Json<IdeasResponse>> {
    let user_id = require_user_id(query.user_id.as_deref())?;
    let ideas = controller.database.list_ideas_with_reports(user_id).await?;
    Ok(Json(IdeasResponse { ideas }))
}

pub async fn save_draft(
    State(controller): State<IdeasController>,
    ApiJson(req): ApiJson<SaveDraftRequest>,
) -> ApiResult<(StatusCode, Json<IdeaResponse>)> {
    let user_id = require_user_id(Some(&req.user_id))?;
    let database = &controller.database;

    match req.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let idea = database.update_draft(id, user_id, &req.fields).await?;
            debug!(idea.id = %idea.id, "draft updated");
            Ok((StatusCode::OK, Json(IdeaResponse { idea })))
        }
        None => {
            let idea = database.create_idea(user_id, &req.fields).await?;
            database
                .log_activity(
                    &NewActivity::new(user_id, EntityType::Idea, &idea.id, "draft_created")
                        .with_details(json!({ "idea_title": idea.fields.title })),
                )
                .await?;
            Ok((StatusCode::CREATED, Json(IdeaResponse { idea })))
        }
    }
}

/// One idea with its report, if it has one.
pub async fn get_idea(
    State(controller): State<IdeasController>,
    Path(id): Path<String>,
) -> ApiResult<Json<IdeaWithReport>> {
    let idea = controller.database.get_idea(&id).await?.ok_or_else(|| FvError::not_found("Idea"))?;
    let validation_report = controller.database.get_report_for_idea(&id).await?;
    Ok(Json(IdeaWithReport { idea, validation_report }))
}

pub async fn delete_idea(
    State(controller): State<IdeasController>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<UserIdQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let user_id = require_user_id(query.user_id.as_deref())?;
    if !controller.database.delete_idea(&id, user_id).await? {
        return Err(FvError::not_found("Idea").into());
    }
    Ok(Json(json!({ "success": true })))
}
