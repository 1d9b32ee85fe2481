use crate::{FvError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of an idea.
///
/// Transitions only move forward: `draft -> validating -> completed | failed`.
/// A draft may be edited any number of times; `completed` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    Draft,
    Validating,
    Completed,
    Failed,
}

impl IdeaStatus {
    pub const ALL: [IdeaStatus; 4] =
        [IdeaStatus::Draft, IdeaStatus::Validating, IdeaStatus::Completed, IdeaStatus::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaStatus::Draft => "draft",
            IdeaStatus::Validating => "validating",
            IdeaStatus::Completed => "completed",
            IdeaStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IdeaStatus::Completed | IdeaStatus::Failed)
    }

    pub fn can_transition_to(&self, next: IdeaStatus) -> bool {
        matches!(
            (self, next),
            (IdeaStatus::Draft, IdeaStatus::Draft)
                | (IdeaStatus::Draft, IdeaStatus::Validating)
                | (IdeaStatus::Validating, IdeaStatus::Completed)
                | (IdeaStatus::Validating, IdeaStatus::Failed)
        )
    }

    pub fn ensure_transition(&self, next: IdeaStatus) -> Result<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(FvError::InvalidTransition { from: *self, to: next })
        }
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdeaStatus {
    type Err = FvError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(IdeaStatus::Draft),
            "validating" => Ok(IdeaStatus::Validating),
            "completed" => Ok(IdeaStatus::Completed),
            "failed" => Ok(IdeaStatus::Failed),
            other => Err(FvError::Validation(format!("unknown idea status '{other}'"))),
        }
    }
}

/// Validation progress checkpoints written while a validation runs.
pub mod progress {
    pub const STARTED: i64 = 25;
    pub const ANALYZING: i64 = 50;
    pub const COMPILING: i64 = 75;
    pub const DONE: i64 = 100;
}

/// Free-text attributes collected by the submission wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub target_market: Option<String>,
    #[serde(default)]
    pub revenue_model: Option<String>,
    #[serde(default)]
    pub key_features: Option<String>,
    #[serde(default)]
    pub problem_solving: Option<String>,
    #[serde(default)]
    pub competitive_advantage: Option<String>,
    #[serde(default)]
    pub market_size_estimate: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
}

impl IdeaFields {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Default::default() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_target_market(mut self, target_market: impl Into<String>) -> Self {
        self.target_market = Some(target_market.into());
        self
    }

    pub fn with_key_features(mut self, key_features: impl Into<String>) -> Self {
        self.key_features = Some(key_features.into());
        self
    }

    /// Title and description must both be present before an idea can be validated.
    pub fn ensure_submittable(&self) -> Result<()> {
        let has_description =
            self.description.as_deref().map(|d| !d.trim().is_empty()).unwrap_or(false);
        if self.title.trim().is_empty() || !has_description {
            return Err(FvError::Validation(
                "Missing required fields: title and description are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stored idea row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub fields: IdeaFields,
    pub status: IdeaStatus,
    pub is_draft: bool,
    pub validation_progress: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(IdeaStatus::Draft.can_transition_to(IdeaStatus::Draft));
        assert!(IdeaStatus::Draft.can_transition_to(IdeaStatus::Validating));
        assert!(IdeaStatus::Validating.can_transition_to(IdeaStatus::Completed));
        assert!(IdeaStatus::Validating.can_transition_to(IdeaStatus::Failed));
    }

    #[test]
    fn terminal_states_never_move() {
        for terminal in [IdeaStatus::Completed, IdeaStatus::Failed] {
            assert!(terminal.is_terminal());
            for next in IdeaStatus::ALL {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn nothing_returns_to_draft_once_submitted() {
        for from in [IdeaStatus::Validating, IdeaStatus::Completed, IdeaStatus::Failed] {
            let err = from.ensure_transition(IdeaStatus::Draft).unwrap_err();
            assert!(matches!(err, FvError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn status_parses_its_own_display() {
        for status in IdeaStatus::ALL {
            assert_eq!(status.to_string().parse::<IdeaStatus>().unwrap(), status);
        }
        assert!("archived".parse::<IdeaStatus>().is_err());
    }

    #[test]
    fn submittable_requires_title_and_description() {
        assert!(IdeaFields::new("Pet insurance").ensure_submittable().is_err());
        assert!(IdeaFields::new("  ").with_description("x").ensure_submittable().is_err());
        assert!(
            IdeaFields::new("Pet insurance")
                .with_description("Cheap cover for cats")
                .ensure_submittable()
                .is_ok()
        );
    }

    #[test]
    fn idea_serializes_fields_flat() {
        let now = Utc::now();
        let idea = Idea {
            id: "i1".into(),
            user_id: "u1".into(),
            fields: IdeaFields::new("Drone delivery").with_industry("logistics"),
            status: IdeaStatus::Draft,
            is_draft: true,
            validation_progress: 0,
            share_token: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&idea).unwrap();
        assert_eq!(json["title"], "Drone delivery");
        assert_eq!(json["industry"], "logistics");
        assert_eq!(json["status"], "draft");
        assert!(json.get("share_token").is_none());
    }
}
