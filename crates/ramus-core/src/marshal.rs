//! Marshallers turn typed values into response bodies.
//!
//! [`TextMarshaller`] is the identity marshaller used by `complete(text)`.
//! [`JsonMarshaller`] honours the client's accept-set.

use bytes::Bytes;
use serde::Serialize;

use crate::error::{MarshalError, UnacceptableContent};
use crate::response::TEXT_PLAIN_UTF_8;

/// Content type produced by [`JsonMarshaller`].
pub const APPLICATION_JSON: &str = "application/json";

/// A marshalled body and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marshalled {
    /// Body bytes.
    pub body: Bytes,
    /// Content type of `body`.
    pub content_type: String,
}

/// Converts a value into response bytes for an accept-set.
///
/// `accepted` holds media ranges from the `Accept` header with parameters
/// stripped. An empty accept-set means the client accepts anything.
pub trait Marshaller<T: ?Sized> {
    /// Marshals `value`.
    ///
    /// Declines with [`MarshalError::Unacceptable`] when no acceptable
    /// content type can be produced.
    fn marshal(&self, value: &T, accepted: &[String]) -> Result<Marshalled, MarshalError>;
}

/// Writes text as UTF-8 `text/plain`, ignoring the accept-set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMarshaller;

impl<T: AsRef<str> + ?Sized> Marshaller<T> for TextMarshaller {
    fn marshal(&self, value: &T, _accepted: &[String]) -> Result<Marshalled, MarshalError> {
        Ok(Marshalled {
            body: Bytes::copy_from_slice(value.as_ref().as_bytes()),
            content_type: TEXT_PLAIN_UTF_8.to_string(),
        })
    }
}

/// Serializes values as JSON when the client accepts `application/json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

impl<T: Serialize + ?Sized> Marshaller<T> for JsonMarshaller {
    fn marshal(&self, value: &T, accepted: &[String]) -> Result<Marshalled, MarshalError> {
        if !accepts(accepted, APPLICATION_JSON) {
            return Err(UnacceptableContent {
                offered: APPLICATION_JSON.to_string(),
                accepted: accepted.to_vec(),
            }
            .into());
        }

        let body =
            serde_json::to_vec(value).map_err(|e| MarshalError::Serialization(e.to_string()))?;
        Ok(Marshalled {
            body: Bytes::from(body),
            content_type: APPLICATION_JSON.to_string(),
        })
    }
}

/// Returns `true` if `content_type` matches one of the media ranges.
///
/// An empty accept-set accepts everything.
#[must_use]
pub fn accepts(accepted: &[String], content_type: &str) -> bool {
    if accepted.is_empty() {
        return true;
    }

    let (main, _) = content_type.split_once('/').unwrap_or((content_type, ""));
    accepted.iter().any(|range| {
        range == "*/*"
            || range.eq_ignore_ascii_case(content_type)
            || range
                .strip_suffix("/*")
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(main))
    })
}
