//! The [`Extraction`] value object.

use std::fmt;
use std::sync::Arc;

use ramus_core::{
    Extract, ExtractionError, ExtractionKey, ExtractionSource, ParserId, Request, RequestContext,
};

struct ParseFn<T>(Box<dyn Fn(&str) -> Result<T, String> + Send + Sync>);

/// A named, typed projection from a request.
///
/// An extraction reads one raw string from its source and parses it. It is
/// immutable and cheap to clone, so one instance can be built at startup and
/// shared by every request.
///
/// Within one [`RequestContext`], results are memoized per extraction
/// instance: clones share a slot, separately built extractions do not.
///
/// # Example
///
/// ```
/// use ramus_extract::Extraction;
/// use ramus_core::{ExtractionSource, Request, RequestContext};
///
/// let port = Extraction::custom(ExtractionSource::Query, "port", "u16", |raw| {
///     raw.parse::<u16>().map_err(|e| e.to_string())
/// });
///
/// let request = Request::builder().uri("/?port=8080").build().unwrap();
/// let mut ctx = RequestContext::new(request);
/// assert_eq!(port.get(&mut ctx).unwrap(), 8080);
/// ```
pub struct Extraction<T> {
    source: ExtractionSource,
    name: Arc<str>,
    parser_label: &'static str,
    parser: Arc<ParseFn<T>>,
}

impl<T> Extraction<T>
where
    T: Clone + Send + 'static,
{
    /// Creates an extraction with a user-defined parser.
    ///
    /// `parser_label` names the parser in logs and debug output.
    /// For [`ExtractionSource::Path`], `name` is the segment index.
    pub fn custom<F>(
        source: ExtractionSource,
        name: impl Into<String>,
        parser_label: &'static str,
        parser: F,
    ) -> Self
    where
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            source,
            name: Arc::from(name.into()),
            parser_label,
            parser: Arc::new(ParseFn(Box::new(parser))),
        }
    }

    /// Extracts the value through the context's memo.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] if the value is absent or malformed.
    pub fn get(&self, ctx: &mut RequestContext) -> Result<T, ExtractionError> {
        ctx.get(self)
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn source(&self) -> ExtractionSource {
        self.source
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn parser_id(&self) -> ParserId {
        let parser = Arc::clone(&self.parser);
        ParserId::new(parser)
    }

    pub(crate) fn raw<'r>(&self, request: &'r Request) -> Option<&'r str> {
        match self.source {
            ExtractionSource::Query => request.query(&self.name),
            ExtractionSource::Header => request.header(&self.name),
            ExtractionSource::Path => self
                .name
                .parse::<usize>()
                .ok()
                .and_then(|index| request.segments().get(index))
                .map(String::as_str),
        }
    }

    pub(crate) fn parse(&self, raw: &str) -> Result<T, ExtractionError> {
        (self.parser.0)(raw)
            .map_err(|detail| ExtractionError::malformed(self.source, self.name.as_ref(), detail))
    }
}

impl<T> Extract for Extraction<T>
where
    T: Clone + Send + 'static,
{
    type Output = T;

    fn key(&self) -> ExtractionKey {
        ExtractionKey::new::<T>(self.source, self.name.as_ref(), self.parser_label)
            .with_parser_id(self.parser_id())
    }

    fn extract(&self, request: &Request) -> Result<T, ExtractionError> {
        let raw = self
            .raw(request)
            .ok_or_else(|| ExtractionError::missing(self.source, self.name.as_ref()))?;
        self.parse(raw)
    }
}

impl<T> Clone for Extraction<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            name: Arc::clone(&self.name),
            parser_label: self.parser_label,
            parser: Arc::clone(&self.parser),
        }
    }
}

impl<T> fmt::Debug for Extraction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extraction")
            .field("source", &self.source)
            .field("name", &self.name)
            .field("parser", &self.parser_label)
            .finish_non_exhaustive()
    }
}

/// Wraps an extraction so that an absent value yields `None`.
///
/// Malformed values still fail.
#[derive(Debug, Clone)]
pub struct Optional<T>(Extraction<T>);

impl<T> Optional<T>
where
    T: Clone + Send + 'static,
{
    /// Extracts the value through the context's memo.
    pub fn get(&self, ctx: &mut RequestContext) -> Result<Option<T>, ExtractionError> {
        ctx.get(self)
    }
}

impl<T> Extract for Optional<T>
where
    T: Clone + Send + 'static,
{
    type Output = Option<T>;

    fn key(&self) -> ExtractionKey {
        ExtractionKey::new::<Option<T>>(self.0.source, self.0.name.as_ref(), self.0.parser_label)
            .with_parser_id(self.0.parser_id())
    }

    fn extract(&self, request: &Request) -> Result<Option<T>, ExtractionError> {
        self.0.raw(request).map(|raw| self.0.parse(raw)).transpose()
    }
}

/// Makes an extraction optional.
///
/// # Example
///
/// ```
/// use ramus_extract::{int_parameter, optional};
/// use ramus_core::{Request, RequestContext};
///
/// let limit = optional(int_parameter("limit"));
/// let mut ctx = RequestContext::new(Request::builder().uri("/").build().unwrap());
/// assert_eq!(limit.get(&mut ctx).unwrap(), None);
/// ```
pub fn optional<T>(extraction: Extraction<T>) -> Optional<T>
where
    T: Clone + Send + 'static,
{
    Optional(extraction)
}
