//! Caller identity. Sign-in happens upstream; requests arrive with the signed-in address in
//! the `x-user-email` header.

use crate::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use fv_core::{FvError, User};
use fv_store::Database;

pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The signed-in caller's email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub email: String,
}

impl Caller {
    /// The caller's stored profile. Callers without a profile are unknown users.
    pub async fn user(&self, database: &Database) -> fv_core::Result<User> {
        database.require_user_by_email(&self.email).await
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or(ApiError(FvError::Unauthorized))?;
        Ok(Self { email: email.to_string() })
    }
}
