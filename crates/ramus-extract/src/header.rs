//! Header extractions.

use ramus_core::ExtractionSource;

use crate::Extraction;

/// Reads a header value as a string. The name is matched case-insensitively.
///
/// # Example
///
/// ```
/// use ramus_extract::header;
/// use ramus_core::{Request, RequestContext};
///
/// let request = Request::builder().header("X-Tenant", "acme").build().unwrap();
/// let mut ctx = RequestContext::new(request);
/// assert_eq!(header("x-tenant").get(&mut ctx).unwrap(), "acme");
/// ```
pub fn header(name: impl Into<String>) -> Extraction<String> {
    let name = name.into().to_ascii_lowercase();
    Extraction::custom(ExtractionSource::Header, name, "string", |raw| {
        Ok(raw.to_string())
    })
}
