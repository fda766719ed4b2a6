//! Path segment extractions.
//!
//! Segments are indexed from zero over the request path with empty segments
//! dropped, independent of how much of the path a route consumed.

use ramus_core::ExtractionSource;

use crate::Extraction;

/// Reads the path segment at `index` as a string.
///
/// # Example
///
/// ```
/// use ramus_extract::path_segment;
/// use ramus_core::{Request, RequestContext};
///
/// let request = Request::builder().uri("/users/42/posts").build().unwrap();
/// let mut ctx = RequestContext::new(request);
/// assert_eq!(path_segment(1).get(&mut ctx).unwrap(), "42");
/// ```
pub fn path_segment(index: usize) -> Extraction<String> {
    Extraction::custom(ExtractionSource::Path, index.to_string(), "string", |raw| {
        Ok(raw.to_string())
    })
}
