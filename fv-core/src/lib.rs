//! # fv-core
//!
//! Domain types and shared contracts for FutureValidate.
//!
//! - [`Idea`] / [`IdeaStatus`] - submitted ideas and their one-way lifecycle
//! - [`ValidationResult`] / [`ValidationReport`] - market-analysis output
//! - [`User`], [`Team`], [`NexusResearch`], [`ActivityLog`] - the other stored entities
//! - [`Llm`] - the chat-completion seam every analysis stage calls through
//! - [`FvError`] / [`Result`] - unified error handling

pub mod activity;
pub mod error;
pub mod idea;
pub mod model;
pub mod nexus;
pub mod report;
pub mod team;
pub mod user;

pub use activity::{
    ActivityLog, DEFAULT_ACTIVITY_LIMIT, EntityType, NewActivity, WaitlistEntry, mask_email,
};
pub use error::{DatabaseErrorKind, FvError, Result};
pub use idea::{Idea, IdeaFields, IdeaStatus, progress};
pub use model::{ChatMessage, ChatRequest, ChatResponse, Llm, UsageMetadata};
pub use nexus::{
    DocumentType, MarketCalculations, NewResearch, NexusAnalysis, NexusResearch,
    ProcessingStatus, StartupIdea,
};
pub use report::{
    Competitor, CompetitorAnalysis, MarketTrends, RisksRecommendations, SamData, SomData,
    SwotAnalysis, TamData, ValidationReport, ValidationResult,
};
pub use team::{TEAM_CODE_PREFIX, Team, TeamMember, TeamRole, normalize_team_code};
pub use user::{
    AuthProvider, DEFAULT_MAX_IDEAS_ALLOWED, SubscriptionTier, UpsertUser, User,
    email_local_part, is_valid_email,
};
