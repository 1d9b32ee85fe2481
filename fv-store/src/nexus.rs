use crate::Database;
use crate::codec::{get, get_enum, get_time, new_id, now, to_json};
use crate::error::db_err;
use fv_core::{
    DocumentType, FvError, NewResearch, NexusAnalysis, NexusResearch, ProcessingStatus, Result,
};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;

const RESEARCH_COLUMNS: &str = "id, user_id, title, source_firm, document_type, document_url, \
     document_content, summary, emerging_trends, startup_ideas, market_calculations, \
     strategic_recommendations, startup_potential_score, processing_status, created_at, updated_at";

fn optional_json<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<Option<T>> {
    let raw: Option<String> = get(row, column)?;
    raw.map(|raw| serde_json::from_str(&raw).map_err(FvError::from)).transpose()
}

fn research_from_row(row: &SqliteRow) -> Result<NexusResearch> {
    let processing_status = get_enum(row, "processing_status", ProcessingStatus::parse)?;

    // Analysis columns are only populated once the record completes.
    let summary: Option<String> = get(row, "summary")?;
    let analysis = match (summary, optional_json(row, "market_calculations")?) {
        (Some(summary), Some(market_calculations)) => Some(NexusAnalysis {
            summary,
            emerging_trends: optional_json(row, "emerging_trends")?.unwrap_or_default(),
            startup_ideas: optional_json(row, "startup_ideas")?.unwrap_or_default(),
            market_calculations,
            strategic_recommendations: optional_json(row, "strategic_recommendations")?
                .unwrap_or_default(),
            startup_potential_score: get::<Option<f64>>(row, "startup_potential_score")?
                .unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(NexusResearch {
        id: get(row, "id")?,
        user_id: get(row, "user_id")?,
        title: get(row, "title")?,
        source_firm: get(row, "source_firm")?,
        document_type: get_enum(row, "document_type", DocumentType::parse)?,
        document_url: get(row, "document_url")?,
        document_content: get(row, "document_content")?,
        analysis,
        processing_status,
        created_at: get_time(row, "created_at")?,
        updated_at: get_time(row, "updated_at")?,
    })
}

impl Database {
    /// Stores the document in `processing`.
    pub async fn create_research(&self, user_id: &str, input: &NewResearch) -> Result<NexusResearch> {
        let id = new_id();
        let (_, at) = now();

        sqlx::query(
            r#"
            INSERT INTO nexus_research (id, user_id, title, source_firm, document_type,
                                        document_url, document_content, processing_status,
                                        created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'processing', ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(input.title.trim())
        .bind(&input.source_firm)
        .bind(input.document_type.as_str())
        .bind(&input.document_url)
        .bind(&input.document_content)
        .bind(&at)
        .bind(&at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("insert research failed", e))?;

        self.get_research(&id).await?.ok_or_else(|| FvError::not_found("Research"))
    }

    /// `processing -> completed` with the analysis attached.
    pub async fn complete_research(
        &self,
        id: &str,
        analysis: &NexusAnalysis,
    ) -> Result<NexusResearch> {
        let (_, at) = now();
        let done = sqlx::query(
            r#"
            UPDATE nexus_research
            SET summary = ?, emerging_trends = ?, startup_ideas = ?, market_calculations = ?,
                strategic_recommendations = ?, startup_potential_score = ?,
                processing_status = 'completed', updated_at = ?
            WHERE id = ? AND processing_status = 'processing'
            "#,
        )
        .bind(&analysis.summary)
        .bind(to_json(&analysis.emerging_trends)?)
        .bind(to_json(&analysis.startup_ideas)?)
        .bind(to_json(&analysis.market_calculations)?)
        .bind(to_json(&analysis.strategic_recommendations)?)
        .bind(analysis.startup_potential_score)
        .bind(&at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("complete research failed", e))?;

        if done.rows_affected() == 0 {
            return Err(FvError::not_found("Research"));
        }
        self.get_research(id).await?.ok_or_else(|| FvError::not_found("Research"))
    }

    /// `processing -> failed`.
    pub async fn fail_research(&self, id: &str) -> Result<()> {
        let (_, at) = now();
        let done = sqlx::query(
            "UPDATE nexus_research SET processing_status = 'failed', updated_at = ? \
             WHERE id = ? AND processing_status = 'processing'",
        )
        .bind(&at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("fail research failed", e))?;

        if done.rows_affected() == 0 {
            return Err(FvError::not_found("Research"));
        }
        Ok(())
    }

    pub async fn get_research(&self, id: &str) -> Result<Option<NexusResearch>> {
        let row = sqlx::query(&format!("SELECT {RESEARCH_COLUMNS} FROM nexus_research WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("research lookup failed", e))?;
        row.as_ref().map(research_from_row).transpose()
    }

    /// Newest first.
    pub async fn list_research_for_user(&self, user_id: &str) -> Result<Vec<NexusResearch>> {
        let rows = sqlx::query(&format!(
            "SELECT {RESEARCH_COLUMNS} FROM nexus_research WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("list research failed", e))?;
        rows.iter().map(research_from_row).collect()
    }
}
