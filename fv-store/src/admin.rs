use crate::codec::get;
use crate::error::db_err;
use crate::ideas::{idea_columns, idea_from_row};
use crate::{AdminIdeaRow, AdminStats, Database};
use fv_core::Result;

impl Database {
    /// Every idea, newest first, with its owner and score when a report exists.
    pub async fn list_all_ideas(&self) -> Result<Vec<AdminIdeaRow>> {
        let rows = sqlx::query(&format!(
            "SELECT {}, u.email AS user_email, u.full_name AS user_name, \
                    r.viability_score AS report_score \
             FROM ideas i \
             JOIN users u ON u.id = i.user_id \
             LEFT JOIN validation_reports r ON r.idea_id = i.id \
             ORDER BY i.created_at DESC, i.rowid DESC",
            idea_columns("i")
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("list all ideas failed", e))?;

        rows.iter()
            .map(|row| {
                Ok(AdminIdeaRow {
                    idea: idea_from_row(row)?,
                    user_email: get(row, "user_email")?,
                    user_name: get(row, "user_name")?,
                    viability_score: get(row, "report_score")?,
                })
            })
            .collect()
    }

    pub async fn admin_stats(&self) -> Result<AdminStats> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM ideas) AS total_ideas,
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT AVG(viability_score) FROM validation_reports) AS avg_score,
                (SELECT COUNT(*) FROM ideas WHERE status = 'completed') AS completed_validations
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("admin stats failed", e))?;

        Ok(AdminStats {
            total_ideas: get(&row, "total_ideas")?,
            total_users: get(&row, "total_users")?,
            avg_score: get::<Option<f64>>(&row, "avg_score")?.unwrap_or(0.0),
            completed_validations: get(&row, "completed_validations")?,
        })
    }
}
