//! Row decoding helpers shared by the entity modules.

use chrono::{DateTime, SecondsFormat, Utc};
use fv_core::{FvError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Decode, Row, Type};

/// Fixed-width RFC 3339 so text ordering matches time ordering.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn now() -> (DateTime<Utc>, String) {
    let at = Utc::now();
    (at, timestamp(at))
}

pub(crate) fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(column)
        .map_err(|e| FvError::database(format!("failed to read column '{column}': {e}")))
}

pub(crate) fn get_time(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let raw: String = get(row, column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| FvError::database(format!("bad timestamp in '{column}': {e}")))
}

pub(crate) fn get_json<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<T> {
    let raw: String = get(row, column)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Parses a stored enum label with the type's own parser.
pub(crate) fn get_enum<T>(
    row: &SqliteRow,
    column: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T> {
    let raw: String = get(row, column)?;
    parse(&raw).ok_or_else(|| FvError::database(format!("unknown value '{raw}' in '{column}'")))
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_as_text() {
        let early = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let late = early + chrono::Duration::milliseconds(1500);
        assert!(timestamp(early) < timestamp(late));
        assert_eq!(timestamp(early), "2026-01-02T03:04:05.000000Z");
    }
}
