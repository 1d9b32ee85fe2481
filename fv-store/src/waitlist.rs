use crate::Database;
use crate::codec::{get, get_time, now};
use crate::error::db_err;
use fv_core::{Result, WaitlistEntry};

const DEFAULT_SOURCE: &str = "homepage";

impl Database {
    /// Returns `false` when the address was already on the list.
    pub async fn add_to_waitlist(&self, email: &str, source: Option<&str>) -> Result<bool> {
        let (_, at) = now();
        let source = source.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SOURCE);

        let done = sqlx::query(
            "INSERT INTO waitlist (email, source, created_at) VALUES (?, ?, ?) \
             ON CONFLICT(email) DO NOTHING",
        )
        .bind(email.trim().to_lowercase())
        .bind(source)
        .bind(&at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("waitlist insert failed", e))?;
        Ok(done.rows_affected() > 0)
    }

    /// Newest first.
    pub async fn list_waitlist(&self) -> Result<Vec<WaitlistEntry>> {
        let rows = sqlx::query(
            "SELECT email, source, created_at FROM waitlist ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("list waitlist failed", e))?;

        rows.iter()
            .map(|row| {
                Ok(WaitlistEntry {
                    email: get(row, "email")?,
                    source: get(row, "source")?,
                    created_at: get_time(row, "created_at")?,
                })
            })
            .collect()
    }
}
