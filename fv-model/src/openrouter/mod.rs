//! OpenRouter (and any other OpenAI-compatible `/chat/completions` endpoint).

mod client;
mod config;
mod convert;

pub use client::{OpenRouterClient, PROVIDER_NAME};
pub use config::{DEFAULT_APP_TITLE, OPENROUTER_API_BASE, OpenRouterConfig};
