//! Mapping from [`FvError`] to HTTP status codes and JSON error bodies.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, State, rejection::JsonRejection, rejection::QueryRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fv_core::{DatabaseErrorKind, FvError};
use fv_telemetry::{error, warn};
use serde_json::{Value, json};

pub const LIMIT_REACHED_MESSAGE: &str =
    "Validation limit reached. You've used all your free validations.";

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub FvError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<FvError> for ApiError {
    fn from(error: FvError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(FvError::Validation(format!("Invalid request body: {}", rejection.body_text())))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(FvError::Validation(format!("Invalid query string: {}", rejection.body_text())))
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(FvError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FvError::Validation(_) => StatusCode::BAD_REQUEST,
            FvError::NotFound(_) => StatusCode::NOT_FOUND,
            FvError::LimitReached { .. } | FvError::Forbidden => StatusCode::FORBIDDEN,
            FvError::Unauthorized => StatusCode::UNAUTHORIZED,
            FvError::InvalidTransition { .. } => StatusCode::CONFLICT,
            FvError::Database { kind: DatabaseErrorKind::UniqueViolation, .. } => {
                StatusCode::CONFLICT
            }
            FvError::Database { .. }
            | FvError::Model(_)
            | FvError::Config(_)
            | FvError::Io(_)
            | FvError::Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message clients see. Internal failures never leak their text here.
    fn public_message(&self) -> String {
        match &self.0 {
            FvError::Validation(message) => message.clone(),
            FvError::NotFound(_) | FvError::InvalidTransition { .. } => self.0.to_string(),
            FvError::LimitReached { .. } => LIMIT_REACHED_MESSAGE.to_string(),
            FvError::Unauthorized => "Authentication required".to_string(),
            FvError::Forbidden => "Access denied".to_string(),
            FvError::Database { kind, .. } => match kind {
                DatabaseErrorKind::UniqueViolation => "Record already exists",
                DatabaseErrorKind::ForeignKeyViolation => "Referenced record not found",
                DatabaseErrorKind::Other => "Database operation failed",
            }
            .to_string(),
            FvError::Model(_) | FvError::Config(_) | FvError::Io(_) | FvError::Serde(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// Error body plus the internal error text, for [`expose_error_details`].
#[derive(Clone, Debug)]
struct ErrorPayload {
    body: Value,
    details: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({ "error": self.public_message() });
        if let FvError::LimitReached { used, allowed } = &self.0 {
            body["limit_reached"] = json!(true);
            body["ideas_validated"] = json!(used);
            body["max_ideas_allowed"] = json!(allowed);
        }

        if status.is_server_error() {
            error!(error = %self.0, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let payload = ErrorPayload { body: body.clone(), details: self.0.to_string() };
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(payload);
        response
    }
}

/// Adds a `details` field with the internal error text to error responses.
pub(crate) async fn expose_error_details(State(expose): State<bool>, response: Response) -> Response {
    if !expose {
        return response;
    }
    match response.extensions().get::<ErrorPayload>().cloned() {
        Some(ErrorPayload { mut body, details }) => {
            if let Some(fields) = body.as_object_mut() {
                fields.insert("details".to_string(), Value::String(details));
            }
            (response.status(), Json(body)).into_response()
        }
        None => response,
    }
}

/// [`Json`] whose rejection is a 400 in the API's error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// [`axum::extract::Query`] whose rejection is a 400 in the API's error shape.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use fv_core::IdeaStatus;

    fn status_of(error: FvError) -> StatusCode {
        ApiError(error).status()
    }

    #[test]
    fn maps_errors_to_statuses() {
        assert_eq!(status_of(FvError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(FvError::not_found("Idea")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(FvError::LimitReached { used: 10, allowed: 10 }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(FvError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(FvError::InvalidTransition {
                from: IdeaStatus::Completed,
                to: IdeaStatus::Validating
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(FvError::Database {
                kind: DatabaseErrorKind::UniqueViolation,
                message: "dup".into()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(FvError::database("boom")), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn database_messages_hide_driver_text() {
        let error = ApiError(FvError::Database {
            kind: DatabaseErrorKind::ForeignKeyViolation,
            message: "FOREIGN KEY constraint failed".into(),
        });
        assert_eq!(error.public_message(), "Referenced record not found");
        assert_eq!(ApiError(FvError::database("x")).public_message(), "Database operation failed");
        assert_eq!(ApiError(FvError::not_found("Idea")).public_message(), "Idea not found");
    }
}
