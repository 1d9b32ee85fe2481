//! # fv-model
//!
//! Chat-completion backends for FutureValidate.
//!
//! - [`OpenRouterClient`] - OpenAI-compatible `/chat/completions` client, OpenRouter by default
//! - [`MockLlm`] - scripted backend for tests
//! - [`json`] - helpers for pulling JSON out of model text
//!
//! ```rust,no_run
//! use fv_model::{OpenRouterClient, OpenRouterConfig};
//!
//! let api_key = std::env::var("OPENROUTER_API_KEY").unwrap();
//! let client = OpenRouterClient::new(OpenRouterConfig::new(api_key, "deepseek/deepseek-r1"))?;
//! # Ok::<(), fv_core::FvError>(())
//! ```

pub mod json;
pub mod mock;
pub mod openrouter;
pub mod retry;

pub use json::{parse_model_json, strip_code_fences};
pub use mock::MockLlm;
pub use openrouter::{OpenRouterClient, OpenRouterConfig};
pub use retry::RetryConfig;
