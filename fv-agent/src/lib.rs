//! # fv-agent
//!
//! The validation pipeline: five prompt-and-parse stages run in order against one
//! chat-completion backend, each with a same-shape local fallback.
//!
//! ```rust,no_run
//! use fv_agent::Validator;
//! use fv_core::IdeaFields;
//!
//! # async fn run() {
//! let validator = Validator::offline();
//! let outcome = validator
//!     .validate(&IdeaFields::new("Drone delivery").with_industry("logistics"))
//!     .await;
//! assert!(outcome.degraded);
//! # }
//! ```

pub mod fallback;
pub mod nexus;
pub mod prompts;
pub mod stages;
mod validator;

pub use nexus::{DEFAULT_NEXUS_MODEL, NexusAnalyst, NexusOutcome};
pub use stages::{
    BusinessPlan, CompetitorLandscape, IdeaSummary, MarketAnalysis, RiskAssessment, Stage,
};
pub use validator::{FALLBACK_PROVIDER, MIXED_PROVIDER, ValidationOutcome, Validator};
