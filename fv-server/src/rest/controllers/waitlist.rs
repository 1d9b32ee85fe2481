use super::users::require_email;
use crate::error::{ApiJson, ApiResult};
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use fv_store::Database;
use fv_telemetry::info;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct WaitlistController {
    database: Database,
}

impl WaitlistController {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[derive(Debug, Deserialize)]
pub struct JoinWaitlistRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JoinWaitlistResponse {
    pub success: bool,
    pub message: &'static str,
    pub already_joined: bool,
}

/// Listing entry with the address masked.
#[derive(Debug, Serialize)]
pub struct MaskedEntry {
    pub email: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct WaitlistResponse {
    pub count: usize,
    pub entries: Vec<MaskedEntry>,
}

pub async fn join_waitlist(
    State(controller): State<WaitlistController>,
    ApiJson(req): ApiJson<JoinWaitlistRequest>,
) -> ApiResult<(StatusCode, Json<JoinWaitlistResponse>)> {
    let email = require_email(req.email.as_deref())?;
    let added = controller.database.add_to_waitlist(&email, req.source.as_deref()).await?;

    if added {
        info!(source = req.source.as_deref().unwrap_or("homepage"), "waitlist signup");
        Ok((
            StatusCode::CREATED,
            Json(JoinWaitlistResponse {
                success: true,
                message: "Successfully joined the waitlist",
                already_joined: false,
            }),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(JoinWaitlistResponse {
                success: true,
                message: "You're already on the waitlist",
                already_joined: true,
            }),
        ))
    }
}

pub async fn list_waitlist(
    State(controller): State<WaitlistController>,
) -> ApiResult<Json<WaitlistResponse>> {
    let entries: Vec<MaskedEntry> = controller
        .database
        .list_waitlist()
        .await?
        .into_iter()
        .map(|entry| MaskedEntry {
            email: entry.masked_email(),
            source: entry.source,
            created_at: entry.created_at,
        })
        .collect();
    Ok(Json(WaitlistResponse { count: entries.len(), entries }))
}
