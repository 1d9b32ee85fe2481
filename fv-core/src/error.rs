use crate::idea::IdeaStatus;

/// Coarse classification of a database failure, independent of the SQL backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum FvError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Database error: {message}")]
    Database { kind: DatabaseErrorKind, message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation limit reached ({used} of {allowed} used)")]
    LimitReached { used: i64, allowed: i64 },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: IdeaStatus, to: IdeaStatus },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl FvError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database { kind: DatabaseErrorKind::Other, message: message.into() }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

pub type Result<T> = std::result::Result<T, FvError>;
