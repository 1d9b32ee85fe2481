use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default page size for activity listings.
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Idea,
    Validation,
    Team,
    Nexus,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Idea => "idea",
            EntityType::Validation => "validation",
            EntityType::Team => "team",
            EntityType::Nexus => "nexus",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idea" => Some(EntityType::Idea),
            "validation" => Some(EntityType::Validation),
            "team" => Some(EntityType::Team),
            "nexus" => Some(EntityType::Nexus),
            _ => None,
        }
    }
}

/// Append-only audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: String,
    pub user_id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub action: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub action: String,
    pub details: Value,
}

impl NewActivity {
    pub fn new(
        user_id: impl Into<String>,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            entity_type,
            entity_id: entity_id.into(),
            action: action.into(),
            details: Value::Object(Default::default()),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub email: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl WaitlistEntry {
    /// `founder@x.io` -> `fo***@x.io`. Addresses with a one-letter local part are left alone.
    pub fn masked_email(&self) -> String {
        mask_email(&self.email)
    }
}

pub fn mask_email(email: &str) -> String {
    let Some(at) = email.rfind('@') else {
        return email.to_string();
    };
    let (local, domain) = email.split_at(at);
    let prefix: String = local.chars().take(2).collect();
    if prefix.chars().count() < 2 {
        return email.to_string();
    }
    format!("{prefix}***{domain}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_local_part() {
        assert_eq!(mask_email("founder@startup.io"), "fo***@startup.io");
        assert_eq!(mask_email("ab@x.io"), "ab***@x.io");
        assert_eq!(mask_email("a@x.io"), "a@x.io");
        assert_eq!(mask_email("nobody"), "nobody");
    }

    #[test]
    fn entity_type_round_trips_through_str() {
        for ty in [EntityType::Idea, EntityType::Validation, EntityType::Team, EntityType::Nexus] {
            assert_eq!(EntityType::parse(ty.as_str()), Some(ty));
        }
    }
}
