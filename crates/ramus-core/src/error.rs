//! Error types for Ramus.
//!
//! Three families live here:
//!
//! - [`ExtractionError`] / [`CompletionError`] / [`HandlerError`]: what user
//!   code sees while a handler runs.
//! - [`RejectionReason`] / [`Rejection`]: what the evaluator reports when no
//!   terminal completed. Each reason maps to an HTTP status.
//! - [`InvalidRequest`]: a request that could not be turned into a [`Request`](crate::Request).
//!
//! # Status mapping
//!
//! | Reason | Status |
//! |---|---|
//! | `MethodNotAllowed` | 405 |
//! | `NotFound` / `Unmatched` | 404 |
//! | `MissingParameter` | 400 |
//! | `UnacceptableContent` | 406 |
//! | `HandlerDidNotComplete` / `HandlerError` | 500 |
//! | `Cancelled` | 503 (never written to the wire) |

use std::fmt;

use http::{header, Method, StatusCode};
use thiserror::Error;

use crate::response::Response;

/// Where an extraction reads its raw value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionSource {
    /// Query string parameters.
    Query,
    /// Path segments.
    Path,
    /// HTTP headers.
    Header,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Path => write!(f, "path"),
            Self::Header => write!(f, "header"),
        }
    }
}

/// Why a parameter could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingKind {
    /// The value is absent from the request.
    Required,
    /// The value is present but could not be parsed.
    Malformed,
}

impl fmt::Display for MissingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Malformed => write!(f, "malformed"),
        }
    }
}

/// An extraction could not produce its value.
///
/// # Example
///
/// ```
/// use ramus_core::{ExtractionError, ExtractionSource, MissingKind};
///
/// let err = ExtractionError::malformed(ExtractionSource::Query, "amount", "invalid digit");
/// assert_eq!(err.name(), "amount");
/// assert_eq!(err.kind(), MissingKind::Malformed);
/// assert!(err.to_string().contains("amount"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} {source_kind} parameter '{name}'{}", detail_suffix(.detail))]
pub struct ExtractionError {
    source_kind: ExtractionSource,
    name: String,
    kind: MissingKind,
    detail: Option<String>,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

impl ExtractionError {
    /// Creates an error for an absent value.
    #[must_use]
    pub fn missing(source: ExtractionSource, name: impl Into<String>) -> Self {
        Self {
            source_kind: source,
            name: name.into(),
            kind: MissingKind::Required,
            detail: None,
        }
    }

    /// Creates an error for a value that failed to parse.
    #[must_use]
    pub fn malformed(
        source: ExtractionSource,
        name: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            source_kind: source,
            name: name.into(),
            kind: MissingKind::Malformed,
            detail: Some(detail.into()),
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.source_kind
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the value was absent or malformed.
    #[must_use]
    pub fn kind(&self) -> MissingKind {
        self.kind
    }

    /// Returns the parser's message for malformed values.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// No marshaller could produce a representation the client accepts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot produce {offered} for accepted types [{}]", .accepted.join(", "))]
pub struct UnacceptableContent {
    /// The content type the marshaller would have produced.
    pub offered: String,
    /// The media ranges the client accepts.
    pub accepted: Vec<String>,
}

/// A marshaller could not produce a body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// The client accepts none of the marshaller's content types.
    #[error(transparent)]
    Unacceptable(#[from] UnacceptableContent),

    /// The value could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// A call to `complete` was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// The context already recorded a response; that response stands.
    #[error("request was already completed")]
    AlreadyCompleted,

    /// The host abandoned the request; the completion was dropped.
    #[error("request was cancelled before completion")]
    Cancelled,

    /// The marshaller declined the value.
    #[error(transparent)]
    UnacceptableContent(#[from] UnacceptableContent),

    /// The marshaller failed to serialize the value.
    #[error("response serialization failed: {0}")]
    Serialization(String),
}

impl From<MarshalError> for CompletionError {
    fn from(err: MarshalError) -> Self {
        match err {
            MarshalError::Unacceptable(unacceptable) => Self::UnacceptableContent(unacceptable),
            MarshalError::Serialization(message) => Self::Serialization(message),
        }
    }
}

/// Error returned by a [`Handler`](crate::Handler).
///
/// Extraction and completion failures convert with `?`. Any other failure
/// goes through [`HandlerError::Internal`], which the evaluator surfaces as a
/// 500 without exposing the cause to the client.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A required parameter was absent or malformed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A completion was refused.
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// The handler failed for its own reasons.
    #[error("handler failed: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// Creates an internal error from a message.
    #[must_use]
    pub fn internal(message: impl fmt::Display) -> Self {
        Self::Internal(anyhow::anyhow!("{message}"))
    }
}

/// A request could not be converted for routing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequest {
    /// The request target is not a valid URI.
    #[error("invalid request uri: {0}")]
    Uri(String),

    /// The query string could not be decoded.
    #[error("invalid query string: {0}")]
    Query(String),

    /// A path segment does not percent-decode to UTF-8.
    #[error("invalid path segment: {0}")]
    Path(String),
}

/// One reason a subtree declined a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// A method guard expected a different method.
    #[error("method not allowed (route accepts {allowed})")]
    MethodNotAllowed {
        /// The method the guard accepts.
        allowed: Method,
    },

    /// A path guard did not match the remaining path.
    #[error("path not found")]
    NotFound,

    /// An extraction failed inside a handler.
    #[error("{kind} {source_kind} parameter '{name}'")]
    MissingParameter {
        /// Where the parameter was read from.
        source_kind: ExtractionSource,
        /// The parameter name.
        name: String,
        /// Absent or malformed.
        kind: MissingKind,
    },

    /// A marshaller could not satisfy the accept-set.
    #[error("unacceptable content")]
    UnacceptableContent {
        /// The media ranges the client accepts.
        accepted: Vec<String>,
    },

    /// A handler returned without completing.
    #[error("handler did not complete the request")]
    HandlerDidNotComplete,

    /// A handler failed. The message is for logs only.
    #[error("handler error: {message}")]
    HandlerError {
        /// Failure description.
        message: String,
    },

    /// The host abandoned the request.
    #[error("request cancelled")]
    Cancelled,

    /// A guard with no children declined.
    #[error("no route matched")]
    Unmatched,
}

impl RejectionReason {
    /// Rank used to pick the reason reported to the client; higher wins.
    #[must_use]
    pub const fn specificity(&self) -> u8 {
        match self {
            Self::Cancelled => 7,
            Self::HandlerError { .. } => 6,
            Self::HandlerDidNotComplete => 5,
            Self::UnacceptableContent { .. } => 4,
            Self::MissingParameter { .. } => 3,
            Self::NotFound => 2,
            Self::MethodNotAllowed { .. } => 1,
            Self::Unmatched => 0,
        }
    }

    /// Returns `true` if evaluation must stop instead of trying siblings.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::HandlerError { .. } | Self::Cancelled)
    }

    /// Returns the HTTP status code for this reason.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound | Self::Unmatched => StatusCode::NOT_FOUND,
            Self::MissingParameter { .. } => StatusCode::BAD_REQUEST,
            Self::UnacceptableContent { .. } => StatusCode::NOT_ACCEPTABLE,
            Self::HandlerDidNotComplete | Self::HandlerError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns the message written to the response body.
    ///
    /// Internal details are never included.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::MethodNotAllowed { allowed } => {
                format!("HTTP method not allowed, supported methods: {allowed}")
            }
            Self::NotFound | Self::Unmatched => {
                "The requested resource could not be found.".to_string()
            }
            Self::MissingParameter {
                source_kind,
                name,
                kind: MissingKind::Required,
            } => format!("Request is missing required {source_kind} parameter '{name}'"),
            Self::MissingParameter {
                source_kind,
                name,
                kind: MissingKind::Malformed,
            } => format!("The {source_kind} parameter '{name}' was malformed"),
            Self::UnacceptableContent { .. } => {
                "The resource is not available in a content type the client accepts.".to_string()
            }
            Self::HandlerDidNotComplete | Self::HandlerError { .. } => {
                "There was an internal server error.".to_string()
            }
            Self::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

impl From<&ExtractionError> for RejectionReason {
    fn from(err: &ExtractionError) -> Self {
        Self::MissingParameter {
            source_kind: err.extraction_source(),
            name: err.name().to_string(),
            kind: err.kind(),
        }
    }
}

/// The accumulated reasons a subtree declined a request.
///
/// Reasons are kept in evaluation order. [`Rejection::primary`] picks the
/// most specific one; among equally specific reasons the first wins.
///
/// # Example
///
/// ```
/// use ramus_core::{Rejection, RejectionReason};
/// use http::{Method, StatusCode};
///
/// let mut rejection = Rejection::single(RejectionReason::MethodNotAllowed { allowed: Method::GET });
/// rejection.push(RejectionReason::NotFound);
///
/// assert_eq!(rejection.primary(), Some(&RejectionReason::NotFound));
/// assert_eq!(rejection.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rejection {
    reasons: Vec<RejectionReason>,
}

impl Rejection {
    /// Creates an empty rejection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rejection with one reason.
    #[must_use]
    pub fn single(reason: RejectionReason) -> Self {
        Self {
            reasons: vec![reason],
        }
    }

    /// Appends a reason.
    pub fn push(&mut self, reason: RejectionReason) {
        self.reasons.push(reason);
    }

    /// Appends all reasons of another rejection, preserving order.
    pub fn merge(&mut self, other: Rejection) {
        self.reasons.extend(other.reasons);
    }

    /// Returns all reasons in evaluation order.
    #[must_use]
    pub fn reasons(&self) -> &[RejectionReason] {
        &self.reasons
    }

    /// Returns `true` if no reason was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Returns the most specific reason.
    #[must_use]
    pub fn primary(&self) -> Option<&RejectionReason> {
        self.reasons.iter().fold(None, |best, reason| match best {
            Some(current) if current.specificity() >= reason.specificity() => Some(current),
            _ => Some(reason),
        })
    }

    /// Returns `true` if any reason stops evaluation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.reasons.iter().any(RejectionReason::is_fatal)
    }

    /// Returns the status code of the primary reason, or 404 when empty.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.primary()
            .map_or(StatusCode::NOT_FOUND, RejectionReason::status_code)
    }

    /// Returns the distinct methods that method guards would have accepted,
    /// in the order they were encountered.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = Vec::new();
        for reason in &self.reasons {
            if let RejectionReason::MethodNotAllowed { allowed } = reason {
                if !methods.contains(allowed) {
                    methods.push(allowed.clone());
                }
            }
        }
        methods
    }

    /// Renders the rejection as the response written to the client.
    ///
    /// The body is the primary reason's public message as plain text. A 405
    /// lists every method the declining guards accept, in the body and in
    /// the `Allow` header.
    #[must_use]
    pub fn to_response(&self) -> Response {
        let status = self.status_code();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            let allowed = self
                .allowed_methods()
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            return Response::text(format!(
                "HTTP method not allowed, supported methods: {allowed}"
            ))
            .with_status(status)
            .with_header(header::ALLOW, &allowed);
        }

        let message = self.primary().map_or_else(
            || RejectionReason::NotFound.public_message(),
            RejectionReason::public_message,
        );
        Response::text(message).with_status(status)
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.primary() {
            Some(reason) => write!(f, "rejected: {reason}"),
            None => write!(f, "rejected"),
        }
    }
}

impl std::error::Error for Rejection {}
