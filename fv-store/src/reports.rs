use crate::codec::{get, get_json, get_time, new_id, now, to_json};
use crate::error::db_err;
use crate::ideas::{idea_columns, idea_from_row};
use crate::{Database, SharedIdea};
use fv_core::{
    FvError, IdeaStatus, Result, ValidationReport, ValidationResult, email_local_part, progress,
};
use fv_telemetry::warn;
use sqlx::sqlite::SqliteRow;

const REPORT_FIELDS: [&str; 16] = [
    "id",
    "idea_id",
    "viability_score",
    "tam_data",
    "sam_data",
    "som_data",
    "swot_analysis",
    "competitor_analysis",
    "market_trends",
    "usp",
    "business_model",
    "risks_recommendations",
    "business_plan",
    "ai_provider",
    "processing_time",
    "created_at",
];

/// Report columns renamed `<alias>_<col>` so they can sit next to idea columns in a join.
pub(crate) fn report_columns(alias: &str) -> String {
    REPORT_FIELDS
        .iter()
        .map(|name| format!("{alias}.{name} AS {alias}_{name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn report_from_row(row: &SqliteRow, prefix: &str) -> Result<ValidationReport> {
    let col = |name: &str| format!("{prefix}{name}");
    Ok(ValidationReport {
        id: get(row, &col("id"))?,
        idea_id: get(row, &col("idea_id"))?,
        result: ValidationResult {
            viability_score: get(row, &col("viability_score"))?,
            tam_data: get_json(row, &col("tam_data"))?,
            sam_data: get_json(row, &col("sam_data"))?,
            som_data: get_json(row, &col("som_data"))?,
            swot_analysis: get_json(row, &col("swot_analysis"))?,
            competitor_analysis: get_json(row, &col("competitor_analysis"))?,
            market_trends: get_json(row, &col("market_trends"))?,
            usp: get(row, &col("usp"))?,
            business_model: get(row, &col("business_model"))?,
            risks_recommendations: get_json(row, &col("risks_recommendations"))?,
            business_plan: get(row, &col("business_plan"))?,
        },
        ai_provider: get(row, &col("ai_provider"))?,
        processing_time: get(row, &col("processing_time"))?,
        created_at: get_time(row, &col("created_at"))?,
    })
}

/// Reads a `r_`-prefixed report from a LEFT JOIN row; `None` when the join found nothing.
pub(crate) fn optional_report_from_row(row: &SqliteRow) -> Result<Option<ValidationReport>> {
    let id: Option<String> = get(row, "r_id")?;
    match id {
        Some(_) => report_from_row(row, "r_").map(Some),
        None => Ok(None),
    }
}

impl Database {
    /// Stores the report and finishes the idea in one transaction.
    ///
    /// The owner's `ideas_validated` counter is incremented only while it is below
    /// `max_ideas_allowed`. When the guard rejects the increment nothing is written, the
    /// idea is marked failed, and [`FvError::LimitReached`] is returned.
    pub async fn complete_validation(
        &self,
        idea_id: &str,
        result: &ValidationResult,
        ai_provider: &str,
        processing_time: i64,
    ) -> Result<ValidationReport> {
        let idea = self.get_idea(idea_id).await?.ok_or_else(|| FvError::not_found("Idea"))?;
        idea.status.ensure_transition(IdeaStatus::Completed)?;

        let (_, at) = now();
        let report_id = new_id();

        let mut tx = self.pool.begin().await.map_err(|e| db_err("transaction failed", e))?;

        let counted = sqlx::query(
            "UPDATE users SET ideas_validated = ideas_validated + 1 \
             WHERE id = ? AND ideas_validated < max_ideas_allowed",
        )
        .bind(&idea.user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("update user failed", e))?;

        if counted.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| db_err("rollback failed", e))?;
            warn!(idea.id = idea_id, user.id = %idea.user_id, "validation limit reached at completion");
            self.mark_failed(idea_id).await?;
            let user = self
                .get_user_by_id(&idea.user_id)
                .await?
                .ok_or_else(|| FvError::not_found("User"))?;
            return Err(FvError::LimitReached {
                used: user.ideas_validated,
                allowed: user.max_ideas_allowed,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO validation_reports (id, idea_id, viability_score, tam_data, sam_data,
                                            som_data, swot_analysis, competitor_analysis,
                                            market_trends, usp, business_model,
                                            risks_recommendations, business_plan, ai_provider,
                                            processing_time, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report_id)
        .bind(idea_id)
        .bind(result.viability_score)
        .bind(to_json(&result.tam_data)?)
        .bind(to_json(&result.sam_data)?)
        .bind(to_json(&result.som_data)?)
        .bind(to_json(&result.swot_analysis)?)
        .bind(to_json(&result.competitor_analysis)?)
        .bind(to_json(&result.market_trends)?)
        .bind(&result.usp)
        .bind(&result.business_model)
        .bind(to_json(&result.risks_recommendations)?)
        .bind(&result.business_plan)
        .bind(ai_provider)
        .bind(processing_time)
        .bind(&at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("insert report failed", e))?;

        let finished = sqlx::query(
            "UPDATE ideas SET status = 'completed', validation_progress = ?, updated_at = ? \
             WHERE id = ? AND status = 'validating'",
        )
        .bind(progress::DONE)
        .bind(&at)
        .bind(idea_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("update idea failed", e))?;

        if finished.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| db_err("rollback failed", e))?;
            return Err(self.transition_error(idea_id, IdeaStatus::Completed).await);
        }

        tx.commit().await.map_err(|e| db_err("commit failed", e))?;

        self.get_report_for_idea(idea_id).await?.ok_or_else(|| FvError::not_found("Report"))
    }

    pub async fn get_report_for_idea(&self, idea_id: &str) -> Result<Option<ValidationReport>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM validation_reports r WHERE r.idea_id = ?",
            report_columns("r")
        ))
        .bind(idea_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("report lookup failed", e))?;
        row.as_ref().map(|row| report_from_row(row, "r_")).transpose()
    }

    /// Resolves a share token to its completed idea. Tokens of unfinished ideas resolve to
    /// nothing.
    pub async fn get_shared_idea(&self, token: &str) -> Result<Option<SharedIdea>> {
        let row = sqlx::query(&format!(
            "SELECT {}, {}, u.full_name AS owner_full_name, u.email AS owner_email \
             FROM ideas i \
             JOIN validation_reports r ON r.idea_id = i.id \
             JOIN users u ON u.id = i.user_id \
             WHERE i.share_token = ? AND i.status = 'completed'",
            idea_columns("i"),
            report_columns("r")
        ))
        .bind(token.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("share lookup failed", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let full_name: Option<String> = get(&row, "owner_full_name")?;
        let email: String = get(&row, "owner_email")?;
        let owner_name = match full_name.filter(|name| !name.is_empty()) {
            Some(name) => name,
            None => email_local_part(&email).to_string(),
        };

        Ok(Some(SharedIdea {
            idea: idea_from_row(&row)?,
            report: report_from_row(&row, "r_")?,
            owner_name,
        }))
    }
}
