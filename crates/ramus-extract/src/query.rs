//! Query string extractions.
//!
//! Query parameters are looked up by name; only the first value of a
//! repeated parameter is seen.

use ramus_core::ExtractionSource;

use crate::Extraction;

/// Reads a query parameter as a signed decimal integer.
///
/// A missing key fails as *required*; a value that is not a valid `i64`
/// fails as *malformed*.
///
/// # Example
///
/// ```
/// use ramus_extract::int_parameter;
/// use ramus_core::{MissingKind, Request, RequestContext};
///
/// let amount = int_parameter("amount");
///
/// let mut ctx = RequestContext::new(Request::builder().uri("/query?amount=-3").build().unwrap());
/// assert_eq!(amount.get(&mut ctx).unwrap(), -3);
///
/// let mut ctx = RequestContext::new(Request::builder().uri("/query?amount=abc").build().unwrap());
/// assert_eq!(amount.get(&mut ctx).unwrap_err().kind(), MissingKind::Malformed);
/// ```
pub fn int_parameter(name: impl Into<String>) -> Extraction<i64> {
    Extraction::custom(ExtractionSource::Query, name, "int", |raw| {
        raw.parse::<i64>()
            .map_err(|e| format!("expected integer: {e}"))
    })
}

/// Reads a query parameter as a string.
pub fn parameter(name: impl Into<String>) -> Extraction<String> {
    Extraction::custom(ExtractionSource::Query, name, "string", |raw| {
        Ok(raw.to_string())
    })
}
