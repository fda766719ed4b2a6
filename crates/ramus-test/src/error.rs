//! Test error types.

use ramus_core::InvalidRequest;
use thiserror::Error;

/// Errors that can occur while sending a test request or reading its response.
#[derive(Debug, Error)]
pub enum TestError {
    /// The request could not be built.
    #[error("request build error: {0}")]
    RequestBuild(#[from] InvalidRequest),

    /// The body is not valid UTF-8.
    #[error("body read error: {0}")]
    BodyRead(String),

    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
