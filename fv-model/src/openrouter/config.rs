use std::time::Duration;

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Sent as `X-Title`; OpenRouter uses it for app attribution.
pub const DEFAULT_APP_TITLE: &str = "FutureValidate";

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    /// Default model when a request does not name one.
    pub model: String,
    pub base_url: Option<String>,
    /// Sent as `HTTP-Referer`.
    pub app_url: Option<String>,
    pub app_title: String,
    pub timeout: Duration,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "deepseek/deepseek-r1".to_string(),
            base_url: None,
            app_url: None,
            app_title: DEFAULT_APP_TITLE.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl OpenRouterConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), ..Default::default() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_app_url(mut self, app_url: impl Into<String>) -> Self {
        self.app_url = Some(app_url.into());
        self
    }

    pub fn with_app_title(mut self, app_title: impl Into<String>) -> Self {
        self.app_title = app_title.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(OPENROUTER_API_BASE)
    }
}
