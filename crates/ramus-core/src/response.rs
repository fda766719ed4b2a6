//! Response type recorded by a completed request.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode};

/// Content type used for every text completion.
pub const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";

/// A finished response: status, headers, body and content type.
///
/// # Example
///
/// ```
/// use ramus_core::{Response, TEXT_PLAIN_UTF_8};
/// use http::StatusCode;
///
/// let response = Response::text("hello");
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.content_type(), Some(TEXT_PLAIN_UTF_8));
/// assert_eq!(response.body_str(), Some("hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    content_type: Option<String>,
}

impl Response {
    /// Creates a response with the given parts and no extra headers.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            content_type,
        }
    }

    /// Creates a `200 OK` plain-text response.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::new(
            StatusCode::OK,
            Bytes::from(body.into()),
            Some(TEXT_PLAIN_UTF_8.to_string()),
        )
    }

    /// Replaces the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Adds a header. Invalid header values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: http::header::HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the extra response headers (content type excluded).
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as UTF-8 if it is valid UTF-8.
    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Returns the content type, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}
