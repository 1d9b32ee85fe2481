//! Market-analysis report shapes shared by the orchestrator, the store, and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TamData {
    pub total_market: f64,
    pub growth_rate: f64,
    #[serde(default)]
    pub year: i32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamData {
    pub serviceable_market: f64,
    #[serde(default)]
    pub penetration_rate: f64,
    #[serde(default)]
    pub target_segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SomData {
    pub obtainable_market: f64,
    pub realistic_capture: f64,
    pub timeframe: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwotAnalysis {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    #[serde(default)]
    pub market_share: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorAnalysis {
    pub direct_competitors: Vec<Competitor>,
    pub competitive_advantage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RisksRecommendations {
    pub risks: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Year label -> projected market size.
pub type MarketTrends = BTreeMap<String, f64>;

/// The compiled output of a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub viability_score: f64,
    pub tam_data: TamData,
    pub sam_data: SamData,
    pub som_data: SomData,
    pub swot_analysis: SwotAnalysis,
    pub competitor_analysis: CompetitorAnalysis,
    pub market_trends: MarketTrends,
    pub usp: String,
    pub business_model: String,
    pub risks_recommendations: RisksRecommendations,
    pub business_plan: String,
}

/// Stored report row, one per completed idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub id: String,
    pub idea_id: String,
    #[serde(flatten)]
    pub result: ValidationResult,
    pub ai_provider: String,
    /// Wall-clock duration of the validation run in milliseconds.
    pub processing_time: i64,
    pub created_at: DateTime<Utc>,
}
