//! # fv-telemetry
//!
//! Structured logging for FutureValidate built on `tracing`.
//!
//! ```rust
//! use fv_telemetry::{LogFormat, info, init_telemetry};
//!
//! init_telemetry("futurevalidate", LogFormat::Pretty).expect("telemetry");
//! info!("ready");
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{LogFormat, init_telemetry};
pub use spans::*;
