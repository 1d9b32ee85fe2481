//! Read models that join more than one table.

use fv_core::{Idea, ValidationReport};
use serde::{Deserialize, Serialize};

/// An idea with its report, present once the idea is completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaWithReport {
    #[serde(flatten)]
    pub idea: Idea,
    pub validation_report: Option<ValidationReport>,
}

/// What a share-token holder sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedIdea {
    pub idea: Idea,
    pub report: ValidationReport,
    pub owner_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminIdeaRow {
    #[serde(flatten)]
    pub idea: Idea,
    pub user_email: String,
    pub user_name: Option<String>,
    pub viability_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_ideas: i64,
    pub total_users: i64,
    /// Mean viability score over stored reports; zero when there are none.
    pub avg_score: f64,
    pub completed_validations: i64,
}
