use super::ideas::{UserIdQuery, require_user_id};
use crate::ServerConfig;
use crate::auth::Caller;
use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use axum::{
    Json,
    extract::{Path, State},
};
use fv_agent::NexusAnalyst;
use fv_core::{EntityType, FvError, NewActivity, NewResearch, NexusResearch};
use fv_store::Database;
use fv_telemetry::{info, warn};
use serde::Serialize;
use serde_json::json;

#[derive(Clone)]
pub struct NexusController {
    database: Database,
    analyst: NexusAnalyst,
}

impl NexusController {
    pub fn new(config: &ServerConfig) -> Self {
        Self { database: config.database.clone(), analyst: config.analyst.clone() }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub research: NexusResearch,
    pub ai_provider: String,
    pub degraded: bool,
}

#[derive(Debug, Serialize)]
pub struct ResearchResponse {
    pub research: NexusResearch,
}

#[derive(Debug, Serialize)]
pub struct ResearchListResponse {
    pub research: Vec<NexusResearch>,
}

pub async fn analyze(
    State(controller): State<NexusController>,
    caller: Caller,
    ApiJson(input): ApiJson<NewResearch>,
) -> ApiResult<Json<AnalyzeResponse>> {
    if input.title.trim().is_empty() || input.document_content.trim().is_empty() {
        return Err(ApiError::validation("Title and document content are required"));
    }
    let database = &controller.database;
    let user = caller.user(database).await?;

    let record = database.create_research(&user.id, &input).await?;
    let outcome = controller.analyst.analyze(&record.id, &input).await;

    let research = match database.complete_research(&record.id, &outcome.analysis).await {
        Ok(research) => research,
        Err(error) => {
            if let Err(fail_error) = database.fail_research(&record.id).await {
                warn!(research.id = %record.id, error = %fail_error, "could not mark research failed");
            }
            return Err(error.into());
        }
    };

    let entry = NewActivity::new(&user.id, EntityType::Nexus, &research.id, "research_analyzed")
        .with_details(json!({
            "title": research.title,
            "potential_score": outcome.analysis.startup_potential_score,
            "ideas_count": outcome.analysis.startup_ideas.len(),
        }));
    if let Err(error) = database.log_activity(&entry).await {
        warn!(research.id = %research.id, error = %error, "could not record research activity");
    }
    info!(research.id = %research.id, degraded = outcome.degraded, "research analyzed");

    Ok(Json(AnalyzeResponse {
        success: true,
        research,
        ai_provider: outcome.provider,
        degraded: outcome.degraded,
    }))
}

pub async fn list_research(
    State(controller): State<NexusController>,
    ApiQuery(query): ApiQuery<UserIdQuery>,
) -> ApiResult<Json<ResearchListResponse>> {
    let user_id = require_user_id(query.user_id.as_deref())?;
    let research = controller.database.list_research_for_user(user_id).await?;
    Ok(Json(ResearchListResponse { research }))
}

pub async fn get_research(
    State(controller): State<NexusController>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResearchResponse>> {
    let research = controller
        .database
        .get_research(&id)
        .await?
        .ok_or_else(|| FvError::not_found("Research"))?;
    Ok(Json(ResearchResponse { research }))
}
