use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use axum::{Json, extract::State};
use fv_core::{FvError, UpsertUser, User, is_valid_email};
use fv_store::Database;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct UsersController {
    database: Database,
}

impl UsersController {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub email: Option<String>,
}

/// Trimmed, non-empty, well-formed address.
pub(crate) fn require_email(email: Option<&str>) -> ApiResult<String> {
    let email = email.map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if !is_valid_email(email) {
        return Err(ApiError::validation("Invalid email format"));
    }
    Ok(email.to_string())
}

pub async fn upsert_user(
    State(controller): State<UsersController>,
    ApiJson(mut input): ApiJson<UpsertUser>,
) -> ApiResult<Json<UserResponse>> {
    input.email = require_email(Some(&input.email))?;
    let user = controller.database.upsert_user(&input).await?;
    Ok(Json(UserResponse { user }))
}

pub async fn get_user(
    State(controller): State<UsersController>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> ApiResult<Json<UserResponse>> {
    let email = require_email(query.email.as_deref())?;
    let user = controller
        .database
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| FvError::not_found("User"))?;
    Ok(Json(UserResponse { user }))
}
