//! # fv-store
//!
//! SQLite persistence for FutureValidate, one `impl Database` block per entity.
//!
//! ```rust,no_run
//! use fv_store::Database;
//!
//! # async fn run() -> fv_core::Result<()> {
//! let db = Database::connect("sqlite://futurevalidate.db?mode=rwc").await?;
//! db.migrate().await?;
//! # Ok(())
//! # }
//! ```

mod activity;
mod admin;
mod codec;
mod database;
mod error;
mod ideas;
mod nexus;
mod records;
mod reports;
mod schema;
mod teams;
mod tokens;
mod users;
mod waitlist;

pub use database::Database;
pub use records::{AdminIdeaRow, AdminStats, IdeaWithReport, SharedIdea};
pub use tokens::{SHARE_TOKEN_LEN, TEAM_CODE_SUFFIX_LEN, generate_share_token, generate_team_code};
