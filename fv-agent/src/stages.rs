//! Typed outputs of the five validation stages.
//!
//! Each stage's output is embedded in the prompts of the stages after it, and the risk
//! stage compiles everything into a [`fv_core::ValidationResult`].

use fv_core::{Competitor, MarketTrends, SamData, SwotAnalysis, TamData};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Summarize,
    Market,
    Competitors,
    Business,
    Risk,
}

impl Stage {
    /// Pipeline order.
    pub const ALL: [Stage; 5] =
        [Stage::Summarize, Stage::Market, Stage::Competitors, Stage::Business, Stage::Risk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Summarize => "summarize",
            Stage::Market => "market",
            Stage::Competitors => "competitors",
            Stage::Business => "business",
            Stage::Risk => "risk",
        }
    }

    /// OpenRouter model used when no override is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            Stage::Summarize | Stage::Risk => "deepseek/deepseek-r1",
            Stage::Market => "qwen/qwen-2.5-72b-instruct",
            Stage::Competitors => "meta-llama/llama-3.2-3b-instruct:free",
            Stage::Business => "mistralai/mistral-7b-instruct:free",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage 1: the idea restated as problem, customer, and value proposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaSummary {
    pub core_problem: String,
    #[serde(default)]
    pub target_customer: String,
    #[serde(default)]
    pub value_proposition: String,
    #[serde(default)]
    pub key_differentiators: Vec<String>,
    #[serde(default)]
    pub market_category: String,
}

/// Stage 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub tam: TamData,
    pub sam: SamData,
    /// Filled from the TAM projection when the model leaves it out.
    #[serde(default)]
    pub market_trends: MarketTrends,
}

/// Stage 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorLandscape {
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub competitive_advantage: String,
    #[serde(default)]
    pub swot: SwotAnalysis,
}

/// Stage 4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessPlan {
    pub business_model: String,
    #[serde(default)]
    pub revenue_streams: Vec<String>,
    #[serde(default)]
    pub usp: String,
    #[serde(default)]
    pub gtm_strategy: String,
    #[serde(default)]
    pub monetization: String,
}

/// Stage 5. A reply without a score does not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub viability_score: f64,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub executive_summary: String,
}

impl RiskAssessment {
    /// Every list and the summary were supplied.
    pub fn is_complete(&self) -> bool {
        !self.risks.is_empty()
            && !self.recommendations.is_empty()
            && !self.executive_summary.trim().is_empty()
    }
}
