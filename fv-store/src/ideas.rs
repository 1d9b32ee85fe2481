use crate::codec::{get, get_time, new_id, now};
use crate::error::{db_err, is_unique_violation};
use crate::tokens::generate_share_token;
use crate::{Database, IdeaWithReport};
use fv_core::{FvError, Idea, IdeaFields, IdeaStatus, Result, progress};
use sqlx::sqlite::SqliteRow;

/// Idea columns in select order; qualified with a table alias by [`idea_columns`].
const IDEA_FIELDS: [&str; 18] = [
    "id",
    "user_id",
    "title",
    "description",
    "industry",
    "target_market",
    "revenue_model",
    "key_features",
    "problem_solving",
    "competitive_advantage",
    "market_size_estimate",
    "timeline",
    "status",
    "is_draft",
    "validation_progress",
    "share_token",
    "created_at",
    "updated_at",
];

/// `alias.col, ...` for every idea column.
pub(crate) fn idea_columns(alias: &str) -> String {
    IDEA_FIELDS
        .iter()
        .map(|name| format!("{alias}.{name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn idea_from_row(row: &SqliteRow) -> Result<Idea> {
    let status: String = get(row, "status")?;
    Ok(Idea {
        id: get(row, "id")?,
        user_id: get(row, "user_id")?,
        fields: IdeaFields {
            title: get(row, "title")?,
            description: get(row, "description")?,
            industry: get(row, "industry")?,
            target_market: get(row, "target_market")?,
            revenue_model: get(row, "revenue_model")?,
            key_features: get(row, "key_features")?,
            problem_solving: get(row, "problem_solving")?,
            competitive_advantage: get(row, "competitive_advantage")?,
            market_size_estimate: get(row, "market_size_estimate")?,
            timeline: get(row, "timeline")?,
        },
        status: status.parse()?,
        is_draft: get(row, "is_draft")?,
        validation_progress: get(row, "validation_progress")?,
        share_token: get(row, "share_token")?,
        created_at: get_time(row, "created_at")?,
        updated_at: get_time(row, "updated_at")?,
    })
}

const SHARE_TOKEN_ATTEMPTS: usize = 3;

impl Database {
    /// Saves a new draft.
    pub async fn create_idea(&self, user_id: &str, fields: &IdeaFields) -> Result<Idea> {
        let id = new_id();
        self.insert_idea(&id, user_id, fields, IdeaStatus::Draft, None).await?;
        self.get_idea(&id).await?.ok_or_else(|| FvError::not_found("Idea"))
    }

    async fn insert_idea(
        &self,
        id: &str,
        user_id: &str,
        fields: &IdeaFields,
        status: IdeaStatus,
        share_token: Option<&str>,
    ) -> Result<()> {
        let (_, at) = now();
        let validation_progress =
            if status == IdeaStatus::Validating { progress::STARTED } else { 0 };

        sqlx::query(
            r#"
            INSERT INTO ideas (id, user_id, title, description, industry, target_market,
                               revenue_model, key_features, problem_solving, competitive_advantage,
                               market_size_estimate, timeline, status, is_draft,
                               validation_progress, share_token, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.industry)
        .bind(&fields.target_market)
        .bind(&fields.revenue_model)
        .bind(&fields.key_features)
        .bind(&fields.problem_solving)
        .bind(&fields.competitive_advantage)
        .bind(&fields.market_size_estimate)
        .bind(&fields.timeline)
        .bind(status.as_str())
        .bind(status == IdeaStatus::Draft)
        .bind(validation_progress)
        .bind(share_token)
        .bind(&at)
        .bind(&at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("insert idea failed", e))?;
        Ok(())
    }

    pub async fn get_idea(&self, id: &str) -> Result<Option<Idea>> {
        let row = sqlx::query(&format!("SELECT {} FROM ideas i WHERE i.id = ?", idea_columns("i")))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("idea lookup failed", e))?;
        row.as_ref().map(idea_from_row).transpose()
    }

    /// An idea the caller owns. Someone else's idea reads as not found.
    pub async fn get_owned_idea(&self, id: &str, user_id: &str) -> Result<Idea> {
        match self.get_idea(id).await? {
            Some(idea) if idea.user_id == user_id => Ok(idea),
            _ => Err(FvError::not_found("Idea")),
        }
    }

    /// Newest first.
    pub async fn list_ideas_for_user(&self, user_id: &str) -> Result<Vec<Idea>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM ideas i WHERE i.user_id = ? ORDER BY i.created_at DESC, i.rowid DESC",
            idea_columns("i")
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("list ideas failed", e))?;
        rows.iter().map(idea_from_row).collect()
    }

    /// Newest first; completed ideas carry their report.
    pub async fn list_ideas_with_reports(&self, user_id: &str) -> Result<Vec<IdeaWithReport>> {
        let rows = sqlx::query(&format!(
            "SELECT {}, {} FROM ideas i LEFT JOIN validation_reports r ON r.idea_id = i.id \
             WHERE i.user_id = ? ORDER BY i.created_at DESC, i.rowid DESC",
            idea_columns("i"),
            crate::reports::report_columns("r")
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("list ideas failed", e))?;

        rows.iter()
            .map(|row| {
                Ok(IdeaWithReport {
                    idea: idea_from_row(row)?,
                    validation_report: crate::reports::optional_report_from_row(row)?,
                })
            })
            .collect()
    }

    /// Replaces a draft's fields. Only drafts can be edited.
    pub async fn update_draft(&self, id: &str, user_id: &str, fields: &IdeaFields) -> Result<Idea> {
        let idea = self.get_owned_idea(id, user_id).await?;
        idea.status.ensure_transition(IdeaStatus::Draft)?;
        let (_, at) = now();

        let done = sqlx::query(
            r#"
            UPDATE ideas SET title = ?, description = ?, industry = ?, target_market = ?,
                             revenue_model = ?, key_features = ?, problem_solving = ?,
                             competitive_advantage = ?, market_size_estimate = ?, timeline = ?,
                             updated_at = ?
            WHERE id = ? AND status = 'draft'
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.industry)
        .bind(&fields.target_market)
        .bind(&fields.revenue_model)
        .bind(&fields.key_features)
        .bind(&fields.problem_solving)
        .bind(&fields.competitive_advantage)
        .bind(&fields.market_size_estimate)
        .bind(&fields.timeline)
        .bind(&at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("update draft failed", e))?;

        if done.rows_affected() == 0 {
            return Err(self.transition_error(id, IdeaStatus::Draft).await);
        }
        self.get_idea(id).await?.ok_or_else(|| FvError::not_found("Idea"))
    }

    /// Returns whether a row was deleted. Reports cascade.
    pub async fn delete_idea(&self, id: &str, user_id: &str) -> Result<bool> {
        let done = sqlx::query("DELETE FROM ideas WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("delete idea failed", e))?;
        Ok(done.rows_affected() > 0)
    }

    /// Moves an idea into `validating` with a fresh share token and progress at 25.
    ///
    /// With `draft_id` the caller's draft is submitted with the given fields; otherwise a new
    /// idea is created directly in `validating`.
    pub async fn begin_validation(
        &self,
        user_id: &str,
        fields: &IdeaFields,
        draft_id: Option<&str>,
    ) -> Result<Idea> {
        fields.ensure_submittable()?;

        let id = match draft_id {
            Some(draft_id) => {
                let draft = self.get_owned_idea(draft_id, user_id).await?;
                draft.status.ensure_transition(IdeaStatus::Validating)?;
                self.submit_draft(draft_id, fields).await?;
                draft_id.to_string()
            }
            None => {
                let id = new_id();
                self.with_share_token(|token| {
                    let id = id.clone();
                    async move {
                        self.insert_idea(&id, user_id, fields, IdeaStatus::Validating, Some(&token))
                            .await
                    }
                })
                .await?;
                id
            }
        };

        self.get_idea(&id).await?.ok_or_else(|| FvError::not_found("Idea"))
    }

    async fn submit_draft(&self, id: &str, fields: &IdeaFields) -> Result<()> {
        let done = self
            .with_share_token(|token| async move {
                let (_, at) = now();
                sqlx::query(
                    r#"
                    UPDATE ideas SET title = ?, description = ?, industry = ?, target_market = ?,
                                     revenue_model = ?, key_features = ?, problem_solving = ?,
                                     competitive_advantage = ?, market_size_estimate = ?,
                                     timeline = ?, status = 'validating', is_draft = 0,
                                     validation_progress = ?, share_token = ?, updated_at = ?
                    WHERE id = ? AND status = 'draft'
                    "#,
                )
                .bind(&fields.title)
                .bind(&fields.description)
                .bind(&fields.industry)
                .bind(&fields.target_market)
                .bind(&fields.revenue_model)
                .bind(&fields.key_features)
                .bind(&fields.problem_solving)
                .bind(&fields.competitive_advantage)
                .bind(&fields.market_size_estimate)
                .bind(&fields.timeline)
                .bind(progress::STARTED)
                .bind(&token)
                .bind(&at)
                .bind(id)
                .execute(&self.pool)
                .await
                .map(|done| done.rows_affected())
                .map_err(|e| db_err("submit draft failed", e))
            })
            .await?;

        if done == 0 {
            return Err(self.transition_error(id, IdeaStatus::Validating).await);
        }
        Ok(())
    }

    /// Runs `write` with a new share token, drawing another if the token collides.
    async fn with_share_token<T, F, Fut>(&self, mut write: F) -> Result<T>
    where
        F: FnMut(String) -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match write(generate_share_token()).await {
                Err(error) if is_unique_violation(&error) && attempt < SHARE_TOKEN_ATTEMPTS => {
                    fv_telemetry::debug!(attempt, "share token collision; retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Records a progress checkpoint on a validating idea.
    pub async fn set_progress(&self, id: &str, validation_progress: i64) -> Result<()> {
        let (_, at) = now();
        let done = sqlx::query(
            "UPDATE ideas SET validation_progress = ?, updated_at = ? \
             WHERE id = ? AND status = 'validating'",
        )
        .bind(validation_progress)
        .bind(&at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("update progress failed", e))?;

        if done.rows_affected() == 0 {
            return Err(self.transition_error(id, IdeaStatus::Validating).await);
        }
        Ok(())
    }

    /// `validating -> failed`, progress reset to zero.
    pub async fn mark_failed(&self, id: &str) -> Result<()> {
        let (_, at) = now();
        let done = sqlx::query(
            "UPDATE ideas SET status = 'failed', validation_progress = 0, updated_at = ? \
             WHERE id = ? AND status = 'validating'",
        )
        .bind(&at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("mark idea failed", e))?;

        if done.rows_affected() == 0 {
            return Err(self.transition_error(id, IdeaStatus::Failed).await);
        }
        Ok(())
    }

    /// Explains why a guarded status update touched no rows.
    pub(crate) async fn transition_error(&self, id: &str, to: IdeaStatus) -> FvError {
        match self.get_idea(id).await {
            Ok(Some(idea)) => FvError::InvalidTransition { from: idea.status, to },
            Ok(None) => FvError::not_found("Idea"),
            Err(error) => error,
        }
    }
}
