use clap::{Args, Parser, Subcommand};
use fv_telemetry::LogFormat;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://futurevalidate.db?mode=rwc";

#[derive(Parser)]
#[command(name = "futurevalidate")]
#[command(about = "FutureValidate startup-idea validation backend", version, long_about = None)]
pub struct Cli {
    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL, global = true)]
    pub database_url: String,

    /// Log output format (pretty or json)
    #[arg(long, env = "FV_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve(ServeArgs),

    /// Create the database schema and exit
    InitDb,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Server port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// OpenRouter API key. Without it every analysis uses fallback output.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible chat-completion API
    #[arg(long, env = "FV_LLM_BASE_URL")]
    pub llm_base_url: Option<String>,

    /// Send every stage to this model instead of the per-stage defaults
    #[arg(long, env = "FV_MODEL")]
    pub model: Option<String>,

    /// Retries per model call on transient failures (0 disables retrying)
    #[arg(long, env = "FV_LLM_MAX_RETRIES", default_value_t = 0)]
    pub llm_max_retries: u32,

    /// Timeout for one model call, in seconds
    #[arg(long, env = "FV_LLM_TIMEOUT_SECS", default_value_t = 60)]
    pub llm_timeout_secs: u64,

    /// Public app URL, sent as the HTTP-Referer to the model API
    #[arg(long, env = "FV_APP_URL")]
    pub app_url: Option<String>,

    /// Comma-separated admin email addresses
    #[arg(long, env = "FV_ADMIN_EMAILS", value_delimiter = ',')]
    pub admin_emails: Vec<String>,

    /// Comma-separated CORS origins (empty allows any origin)
    #[arg(long, env = "FV_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Include internal error text in error responses
    #[arg(long, env = "FV_EXPOSE_ERROR_DETAILS")]
    pub expose_error_details: bool,
}
