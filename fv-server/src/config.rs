use fv_agent::{NexusAnalyst, Validator};
use fv_store::Database;
use std::time::Duration;

const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Security configuration for the API server.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Allowed origins for CORS (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes (default: 10MB)
    pub max_body_size: usize,
    /// Request timeout. A validation makes five sequential model calls, so this is generous.
    pub request_timeout: Duration,
    /// Whether error responses carry the internal error text (default: false)
    pub expose_error_details: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            request_timeout: Duration::from_secs(180),
            expose_error_details: false,
        }
    }
}

impl SecurityConfig {
    /// Permissive CORS and detailed errors.
    pub fn development() -> Self {
        Self { expose_error_details: true, ..Self::default() }
    }

    pub fn production(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins, ..Self::default() }
    }
}

/// Everything the router needs: the store, the two analysis pipelines, and who counts as an
/// admin.
#[derive(Clone)]
pub struct ServerConfig {
    pub database: Database,
    pub validator: Validator,
    pub analyst: NexusAnalyst,
    /// Lowercased admin addresses.
    pub admin_emails: Vec<String>,
    pub security: SecurityConfig,
}

impl ServerConfig {
    /// Starts with offline pipelines; attach a model with [`ServerConfig::with_validator`]
    /// and [`ServerConfig::with_analyst`].
    pub fn new(database: Database) -> Self {
        Self {
            database,
            validator: Validator::offline(),
            analyst: NexusAnalyst::offline(),
            admin_emails: Vec::new(),
            security: SecurityConfig::default(),
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_analyst(mut self, analyst: NexusAnalyst) -> Self {
        self.analyst = analyst;
        self
    }

    pub fn with_admin_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.admin_emails = emails
            .into_iter()
            .map(|email| email.as_ref().trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.security.allowed_origins = origins;
        self
    }

    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.security.max_body_size = size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.security.request_timeout = timeout;
        self
    }

    /// Include internal error text in responses (development only)
    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.security.expose_error_details = expose;
        self
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn database() -> Database {
        Database::connect_in_memory().await.unwrap()
    }

    #[test]
    fn test_security_config_constructors() {
        let default = SecurityConfig::default();
        assert!(default.allowed_origins.is_empty());
        assert_eq!(default.max_body_size, DEFAULT_MAX_BODY_SIZE);
        assert_eq!(default.request_timeout, Duration::from_secs(180));
        assert!(!default.expose_error_details);

        assert!(SecurityConfig::development().expose_error_details);

        let prod = SecurityConfig::production(vec!["https://futurevalidate.app".to_string()]);
        assert_eq!(prod.allowed_origins, vec!["https://futurevalidate.app"]);
        assert!(!prod.expose_error_details);
    }

    #[tokio::test]
    async fn test_server_config_security_passthrough() {
        let config = ServerConfig::new(database().await)
            .with_allowed_origins(vec!["test".into()])
            .with_max_body_size(100)
            .with_request_timeout(Duration::from_secs(10))
            .with_error_details(true);

        assert_eq!(config.security.allowed_origins, vec!["test"]);
        assert_eq!(config.security.max_body_size, 100);
        assert_eq!(config.security.request_timeout, Duration::from_secs(10));
        assert!(config.security.expose_error_details);
        assert!(!config.validator.has_model());
    }

    #[tokio::test]
    async fn test_admin_emails_match_case_insensitively() {
        let config = ServerConfig::new(database().await)
            .with_admin_emails([" Admin@FutureValidate.app ", ""]);

        assert_eq!(config.admin_emails, vec!["admin@futurevalidate.app"]);
        assert!(config.is_admin("ADMIN@futurevalidate.app"));
        assert!(!config.is_admin("founder@startup.io"));
    }
}
