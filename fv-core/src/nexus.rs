//! Research-document analysis ("Nexus") records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[default]
    ResearchPaper,
    ConsultingReport,
    MarketStudy,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::ResearchPaper => "research_paper",
            DocumentType::ConsultingReport => "consulting_report",
            DocumentType::MarketStudy => "market_study",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "research_paper" => Some(DocumentType::ResearchPaper),
            "consulting_report" => Some(DocumentType::ConsultingReport),
            "market_study" => Some(DocumentType::MarketStudy),
            _ => None,
        }
    }

    /// Human label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::ResearchPaper => "research paper",
            DocumentType::ConsultingReport => "consulting report",
            DocumentType::MarketStudy => "market study",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(ProcessingStatus::Processing),
            "completed" => Some(ProcessingStatus::Completed),
            "failed" => Some(ProcessingStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupIdea {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub market_opportunity: String,
    #[serde(default)]
    pub viability_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCalculations {
    pub total_addressable_market: f64,
    pub serviceable_addressable_market: f64,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NexusAnalysis {
    pub summary: String,
    #[serde(default)]
    pub emerging_trends: Vec<String>,
    #[serde(default)]
    pub startup_ideas: Vec<StartupIdea>,
    pub market_calculations: MarketCalculations,
    #[serde(default)]
    pub strategic_recommendations: Vec<String>,
    /// 0-100.
    pub startup_potential_score: f64,
}

/// Input for a new research analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewResearch {
    pub title: String,
    #[serde(default)]
    pub document_type: DocumentType,
    #[serde(default)]
    pub source_firm: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
    pub document_content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NexusResearch {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub source_firm: Option<String>,
    pub document_type: DocumentType,
    pub document_url: Option<String>,
    pub document_content: String,
    pub analysis: Option<NexusAnalysis>,
    pub processing_status: ProcessingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
