use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Free-tier validation allowance for new accounts.
pub const DEFAULT_MAX_IDEAS_ALLOWED: i64 = 10;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// The part of an email address before the `@`.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    #[default]
    Email,
    Google,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: AuthProvider,
    pub subscription_tier: SubscriptionTier,
    pub ideas_validated: i64,
    pub max_ideas_allowed: i64,
    pub team_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl User {
    pub fn limit_reached(&self) -> bool {
        self.ideas_validated >= self.max_ideas_allowed
    }

    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email_local_part(&self.email))
    }
}

/// Sign-in payload used to create or refresh a user row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertUser {
    pub email: String,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(default, alias = "image")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub provider: Option<AuthProvider>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(validated: i64, allowed: i64) -> User {
        let now = Utc::now();
        User {
            id: "u1".into(),
            email: "ada@example.com".into(),
            full_name: None,
            avatar_url: None,
            provider: AuthProvider::Email,
            subscription_tier: SubscriptionTier::Free,
            ideas_validated: validated,
            max_ideas_allowed: allowed,
            team_code: None,
            created_at: now,
            last_login: now,
        }
    }

    #[test]
    fn limit_is_reached_at_the_cap() {
        assert!(!user(9, 10).limit_reached());
        assert!(user(10, 10).limit_reached());
        assert!(user(11, 10).limit_reached());
    }

    #[test]
    fn display_name_falls_back_to_local_part() {
        assert_eq!(user(0, 10).display_name(), "ada");
        let mut named = user(0, 10);
        named.full_name = Some("Ada Lovelace".into());
        assert_eq!(named.display_name(), "Ada Lovelace");
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("founder@startup.io"));
        assert!(!is_valid_email("founder@startup"));
        assert!(!is_valid_email("founder startup@x.io"));
        assert!(!is_valid_email(""));
    }
}
