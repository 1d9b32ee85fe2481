use fv_core::{DatabaseErrorKind, FvError};
use sqlx::error::ErrorKind;

/// Maps a driver error onto [`FvError::Database`], keeping the constraint kind.
pub(crate) fn db_err(context: &str, error: sqlx::Error) -> FvError {
    let kind = match &error {
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation => DatabaseErrorKind::UniqueViolation,
            ErrorKind::ForeignKeyViolation => DatabaseErrorKind::ForeignKeyViolation,
            _ => DatabaseErrorKind::Other,
        },
        _ => DatabaseErrorKind::Other,
    };
    FvError::Database { kind, message: format!("{context}: {error}") }
}

pub(crate) fn is_unique_violation(error: &FvError) -> bool {
    matches!(error, FvError::Database { kind: DatabaseErrorKind::UniqueViolation, .. })
}
