use crate::ServerConfig;
use crate::auth::Caller;
use crate::error::{ApiJson, ApiResult};
use axum::{Json, extract::State};
use fv_agent::{Stage, Validator};
use fv_core::{
    EntityType, FvError, Idea, IdeaFields, NewActivity, ValidationReport, ValidationResult,
    progress,
};
use fv_store::Database;
use fv_telemetry::{Instrument, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

#[derive(Clone)]
pub struct ValidationController {
    database: Database,
    validator: Validator,
}

impl ValidationController {
    pub fn new(config: &ServerConfig) -> Self {
        Self { database: config.database.clone(), validator: config.validator.clone() }
    }
}

/// The idea to validate. With `idea_id` the caller's draft is submitted; otherwise a new idea
/// is created.
///
/// The wizard posts its form as `{"idea_data": {...}}`; the attributes may also sit at the top
/// level. When `idea_data` is present it wins.
#[derive(Debug, Deserialize)]
pub struct ValidateIdeaRequest {
    #[serde(default)]
    pub idea_id: Option<String>,
    #[serde(default)]
    pub idea_data: Option<IdeaFields>,
    #[serde(flatten)]
    pub fields: IdeaFields,
}

impl ValidateIdeaRequest {
    pub fn into_parts(self) -> (Option<String>, IdeaFields) {
        let draft_id = self.idea_id.filter(|id| !id.is_empty());
        (draft_id, self.idea_data.unwrap_or(self.fields))
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateIdeaResponse {
    pub success: bool,
    pub idea_id: String,
    pub share_token: Option<String>,
    pub validation_results: ValidationResult,
    /// Milliseconds.
    pub processing_time: i64,
    pub ai_provider: String,
    pub degraded: bool,
    pub fallback_stages: Vec<Stage>,
}

pub async fn validate_idea(
    State(controller): State<ValidationController>,
    caller: Caller,
    ApiJson(req): ApiJson<ValidateIdeaRequest>,
) -> ApiResult<Json<ValidateIdeaResponse>> {
    let database = &controller.database;
    let user = caller.user(database).await?;
    if user.limit_reached() {
        return Err(FvError::LimitReached {
            used: user.ideas_validated,
            allowed: user.max_ideas_allowed,
        }
        .into());
    }

    let (draft_id, fields) = req.into_parts();
    let idea = database.begin_validation(&user.id, &fields, draft_id.as_deref()).await?;
    let started = Instant::now();

    let outcome = async {
        database.set_progress(&idea.id, progress::ANALYZING).await?;
        let outcome = controller.validator.validate(&idea.fields).await;
        database.set_progress(&idea.id, progress::COMPILING).await?;

        let processing_time = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
        let report = database
            .complete_validation(&idea.id, &outcome.result, &outcome.provider, processing_time)
            .await?;
        Ok::<_, FvError>((outcome, report))
    }
    .instrument(fv_telemetry::validation_run_span(&idea.id))
    .await;

    let (outcome, report) = match outcome {
        Ok(done) => done,
        Err(error) => {
            abandon(database, &idea, &error).await;
            return Err(error.into());
        }
    };

    log_completion(database, &user.id, &idea, &report, outcome.degraded).await;
    info!(
        idea.id = %idea.id,
        viability_score = report.result.viability_score,
        processing_time = report.processing_time,
        degraded = outcome.degraded,
        "validation completed"
    );

    Ok(Json(ValidateIdeaResponse {
        success: true,
        idea_id: idea.id,
        share_token: idea.share_token,
        validation_results: report.result,
        processing_time: report.processing_time,
        ai_provider: report.ai_provider,
        degraded: outcome.degraded,
        fallback_stages: outcome.fallback_stages,
    }))
}

/// Moves a run that errored out of `validating`. The limit guard has already failed the idea.
async fn abandon(database: &Database, idea: &Idea, error: &FvError) {
    if matches!(error, FvError::LimitReached { .. }) {
        return;
    }
    if let Err(mark_error) = database.mark_failed(&idea.id).await {
        warn!(idea.id = %idea.id, error = %mark_error, "could not mark idea failed");
    }
}

/// The audit entry is best effort; the report is already stored.
async fn log_completion(
    database: &Database,
    user_id: &str,
    idea: &Idea,
    report: &ValidationReport,
    degraded: bool,
) {
    let entry = NewActivity::new(user_id, EntityType::Validation, &idea.id, "validation_completed")
        .with_details(json!({
            "idea_title": idea.fields.title,
            "viability_score": report.result.viability_score,
            "processing_time": report.processing_time,
            "degraded": degraded,
        }));
    if let Err(error) = database.log_activity(&entry).await {
        warn!(idea.id = %idea.id, error = %error, "could not record validation activity");
    }
}
