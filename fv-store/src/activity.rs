use crate::Database;
use crate::codec::{get, get_enum, get_json, get_time, new_id, now, to_json};
use crate::error::db_err;
use fv_core::{ActivityLog, DEFAULT_ACTIVITY_LIMIT, EntityType, NewActivity, Result};
use sqlx::sqlite::SqliteRow;

const MAX_ACTIVITY_LIMIT: i64 = 500;

fn activity_from_row(row: &SqliteRow) -> Result<ActivityLog> {
    Ok(ActivityLog {
        id: get(row, "id")?,
        user_id: get(row, "user_id")?,
        entity_type: get_enum(row, "entity_type", EntityType::parse)?,
        entity_id: get(row, "entity_id")?,
        action: get(row, "action")?,
        details: get_json(row, "details")?,
        created_at: get_time(row, "created_at")?,
    })
}

impl Database {
    pub async fn log_activity(&self, entry: &NewActivity) -> Result<ActivityLog> {
        let id = new_id();
        let (created_at, at) = now();

        sqlx::query(
            "INSERT INTO activity_logs (id, user_id, entity_type, entity_id, action, details, \
             created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&entry.user_id)
        .bind(entry.entity_type.as_str())
        .bind(&entry.entity_id)
        .bind(&entry.action)
        .bind(to_json(&entry.details)?)
        .bind(&at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("insert activity failed", e))?;

        Ok(ActivityLog {
            id,
            user_id: entry.user_id.clone(),
            entity_type: entry.entity_type,
            entity_id: entry.entity_id.clone(),
            action: entry.action.clone(),
            details: entry.details.clone(),
            created_at,
        })
    }

    /// Newest first. `limit` defaults to [`DEFAULT_ACTIVITY_LIMIT`] and is clamped to 1..=500.
    pub async fn list_activity(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<ActivityLog>> {
        let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, MAX_ACTIVITY_LIMIT);
        let rows = sqlx::query(
            "SELECT id, user_id, entity_type, entity_id, action, details, created_at \
             FROM activity_logs WHERE user_id = ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("list activity failed", e))?;
        rows.iter().map(activity_from_row).collect()
    }
}
