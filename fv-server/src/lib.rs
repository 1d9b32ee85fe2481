//! # fv-server
//!
//! The FutureValidate HTTP JSON API: an axum router under `/api` over [`fv_store::Database`],
//! the validation pipeline, and the research analyst.

pub mod auth;
pub mod config;
pub mod error;
pub mod rest;

pub use auth::{Caller, USER_EMAIL_HEADER};
pub use config::{SecurityConfig, ServerConfig};
pub use error::{ApiError, ApiResult, LIMIT_REACHED_MESSAGE};
pub use rest::create_app;
