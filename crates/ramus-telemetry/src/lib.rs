//! Logging setup for Ramus services.
//!
//! Ramus crates emit [`tracing`] events: route decisions at `trace`/`debug`,
//! completions at `debug`, handler failures at `warn`/`error` and server
//! lifecycle at `info`. This crate installs the subscriber that prints them.
//!
//! # Example
//!
//! ```rust,no_run
//! use ramus_telemetry::{init_logging, LogConfig};
//!
//! fn main() -> Result<(), ramus_telemetry::TelemetryError> {
//!     init_logging(&LogConfig::production())?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ramus-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
