use crate::error::ApiResult;
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use fv_store::Database;
use fv_telemetry::{info, warn};
use serde_json::{Value, json};

#[derive(Clone)]
pub struct SystemController {
    database: Database,
}

impl SystemController {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

/// Liveness plus a database ping. An unreachable database reports 503.
pub async fn health(State(controller): State<SystemController>) -> (StatusCode, Json<Value>) {
    let timestamp = Utc::now().to_rfc3339();
    match controller.database.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok", "timestamp": timestamp }))),
        Err(error) => {
            warn!(error = %error, "health check could not reach the database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unavailable", "timestamp": timestamp })),
            )
        }
    }
}

pub async fn init_db(State(controller): State<SystemController>) -> ApiResult<Json<Value>> {
    controller.database.migrate().await?;
    info!("database initialized on request");
    Ok(Json(json!({ "success": true, "message": "Database initialized successfully" })))
}
