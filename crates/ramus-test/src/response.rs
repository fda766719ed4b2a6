//! Test response wrapper.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode};
use ramus_core::{Rejection, RejectionReason, Response};
use ramus_router::Outcome;
use serde::de::DeserializeOwned;

use crate::error::TestError;

/// The response a route tree produced, with the rejection behind it if any.
#[derive(Debug, Clone)]
pub struct TestResponse {
    response: Response,
    rejection: Option<Rejection>,
}

impl TestResponse {
    /// Wraps an evaluation outcome.
    #[must_use]
    pub fn from_outcome(outcome: Outcome) -> Self {
        let rejection = outcome.rejection().cloned();
        Self {
            response: outcome.into_response(),
            rejection,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    /// Returns true if the status is successful (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Returns true if a terminal completed the request.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.rejection.is_none()
    }

    /// Returns the rejection when every branch declined.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        self.rejection.as_ref()
    }

    /// Returns the headers set by the response, excluding `Content-Type`.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers().get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.response.content_type()
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        self.response.body()
    }

    /// Returns the underlying response.
    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body().to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(self.body())?)
    }

    /// Parses the body as an untyped JSON value.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Asserts the status code.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status(),
            expected,
            "expected status {expected}, got {} with body {:?}",
            self.status(),
            self.text().unwrap_or_default()
        );
        self
    }

    /// Asserts a header value.
    #[track_caller]
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        assert_eq!(
            self.header_str(name),
            Some(expected.as_ref()),
            "header {name} mismatch"
        );
        self
    }

    /// Asserts the content type.
    #[track_caller]
    pub fn assert_content_type(&self, expected: impl AsRef<str>) -> &Self {
        assert_eq!(self.content_type(), Some(expected.as_ref()), "content type mismatch");
        self
    }

    /// Asserts the whole body.
    #[track_caller]
    pub fn assert_body_eq(&self, expected: impl AsRef<str>) -> &Self {
        let body = self.text().unwrap_or_default();
        assert_eq!(body, expected.as_ref(), "body mismatch");
        self
    }

    /// Asserts that the body contains `expected`.
    #[track_caller]
    pub fn assert_body_contains(&self, expected: impl AsRef<str>) -> &Self {
        let body = self.text().unwrap_or_default();
        assert!(
            body.contains(expected.as_ref()),
            "body {body:?} does not contain {:?}",
            expected.as_ref()
        );
        self
    }

    /// Asserts the reason that decided a rejection.
    #[track_caller]
    pub fn assert_primary_reason(&self, expected: &RejectionReason) -> &Self {
        let primary = self.rejection.as_ref().and_then(Rejection::primary);
        assert_eq!(primary, Some(expected), "primary rejection reason mismatch");
        self
    }
}
