//! Request context types.
//!
//! The [`RequestContext`] is handed to every handler. It owns the request,
//! the single-use response sink and the extraction memo for one evaluation.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use http::StatusCode;
use uuid::Uuid;

use crate::error::{CompletionError, ExtractionError, ExtractionSource};
use crate::marshal::{Marshaller, TextMarshaller};
use crate::request::Request;
use crate::response::Response;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy to
/// correlate.
///
/// # Example
///
/// ```
/// use ramus_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a parser instance.
///
/// Compared and hashed by the address of the shared parser. The key holds a
/// reference, so the address stays unique while the memo is alive.
#[derive(Clone)]
pub struct ParserId(Arc<dyn Any + Send + Sync>);

impl ParserId {
    /// Wraps a shared parser.
    #[must_use]
    pub fn new(parser: Arc<dyn Any + Send + Sync>) -> Self {
        Self(parser)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl PartialEq for ParserId {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl Eq for ParserId {}

impl Hash for ParserId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl std::fmt::Debug for ParserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParserId({:p})", self.addr())
    }
}

/// Identity of an extraction inside one context's memo.
///
/// Two extractions share a memo slot when source, name, parser label,
/// output type and parser instance all agree. Keys without a
/// [`ParserId`] rely on the label alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtractionKey {
    source: ExtractionSource,
    name: String,
    parser: &'static str,
    parser_id: Option<ParserId>,
    output: TypeId,
}

impl ExtractionKey {
    /// Creates a key for an extraction producing `T`.
    #[must_use]
    pub fn new<T: 'static>(source: ExtractionSource, name: impl Into<String>, parser: &'static str) -> Self {
        Self {
            source,
            name: name.into(),
            parser,
            parser_id: None,
            output: TypeId::of::<T>(),
        }
    }

    /// Ties the key to a specific parser instance.
    #[must_use]
    pub fn with_parser_id(mut self, id: ParserId) -> Self {
        self.parser_id = Some(id);
        self
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

    /// Returns the parser label.
    #[must_use]
    pub fn parser(&self) -> &'static str {
        self.parser
    }
}

/// A typed projection from a request, memoizable per context.
///
/// Implemented by `ramus_extract::Extraction`; implement it directly for
/// extractions that need more than a single raw value.
pub trait Extract {
    /// The extracted value.
    type Output: Clone + Send + 'static;

    /// Returns the memo key for this extraction.
    fn key(&self) -> ExtractionKey;

    /// Reads and parses the value from the request.
    fn extract(&self, request: &Request) -> Result<Self::Output, ExtractionError>;
}

/// Handle the host uses to abandon an in-flight request.
///
/// Cloning shares the flag with the context it came from.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Marks the request as cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type Memo = HashMap<ExtractionKey, Box<dyn Any + Send>>;

/// Per-request state passed to handlers.
///
/// A context records at most one response. Once a response is recorded,
/// further completions fail with [`CompletionError::AlreadyCompleted`]; once
/// the host cancels, completions fail with [`CompletionError::Cancelled`]
/// and are dropped.
///
/// # Example
///
/// ```
/// use ramus_core::{CompletionError, Request, RequestContext};
///
/// let request = Request::builder().uri("/").build().unwrap();
/// let mut ctx = RequestContext::new(request);
///
/// ctx.complete("first").unwrap();
/// assert_eq!(ctx.complete("second"), Err(CompletionError::AlreadyCompleted));
/// assert_eq!(ctx.response().unwrap().body_str(), Some("first"));
/// ```
pub struct RequestContext {
    request_id: RequestId,
    request: Request,
    response: Option<Response>,
    cancel: CancelHandle,
    memo: Memo,
}

impl RequestContext {
    /// Creates a context for a request with a fresh request ID.
    #[must_use]
    pub fn new(request: Request) -> Self {
        Self {
            request_id: RequestId::new(),
            request,
            response: None,
            cancel: CancelHandle::default(),
            memo: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request being evaluated.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns a handle the host can use to cancel this request.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Returns `true` if the host cancelled this request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns `true` if a response was recorded.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.response.is_some()
    }

    /// Runs an extraction, reusing the memoized result when present.
    ///
    /// The outcome, success or failure, is cached under the extraction's key,
    /// so the parser runs at most once per context.
    pub fn get<E: Extract>(&mut self, extraction: &E) -> Result<E::Output, ExtractionError> {
        let key = extraction.key();

        if let Some(cached) = self
            .memo
            .get(&key)
            .and_then(|slot| slot.downcast_ref::<Result<E::Output, ExtractionError>>())
        {
            tracing::trace!(
                request_id = %self.request_id,
                name = key.name(),
                "extraction memo hit"
            );
            return cached.clone();
        }

        let result = extraction.extract(&self.request);
        self.memo.insert(key, Box::new(result.clone()));
        result
    }

    /// Completes the request with a UTF-8 `text/plain` body and status 200.
    pub fn complete(&mut self, text: impl AsRef<str>) -> Result<(), CompletionError> {
        self.complete_with(text.as_ref(), &TextMarshaller)
    }

    /// Completes the request with a marshalled value and status 200.
    ///
    /// The marshaller sees the media ranges from the request's `Accept` header.
    pub fn complete_with<T, M>(&mut self, value: &T, marshaller: &M) -> Result<(), CompletionError>
    where
        T: ?Sized,
        M: Marshaller<T>,
    {
        self.ensure_open()?;
        let marshalled = marshaller.marshal(value, &self.request.accepted_types())?;
        self.record(Response::new(
            StatusCode::OK,
            marshalled.body,
            Some(marshalled.content_type),
        ))
    }

    /// Completes the request with a prepared response.
    pub fn complete_response(&mut self, response: Response) -> Result<(), CompletionError> {
        self.ensure_open()?;
        self.record(response)
    }

    /// Returns the recorded response.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Consumes the context, returning the recorded response.
    #[must_use]
    pub fn into_response(self) -> Option<Response> {
        self.response
    }

    fn ensure_open(&self) -> Result<(), CompletionError> {
        if self.is_cancelled() {
            tracing::debug!(request_id = %self.request_id, "completion after cancellation dropped");
            return Err(CompletionError::Cancelled);
        }
        if self.response.is_some() {
            tracing::warn!(request_id = %self.request_id, "request completed more than once");
            return Err(CompletionError::AlreadyCompleted);
        }
        Ok(())
    }

    fn record(&mut self, response: Response) -> Result<(), CompletionError> {
        tracing::debug!(
            request_id = %self.request_id,
            status = response.status().as_u16(),
            "request completed"
        );
        self.response = Some(response);
        Ok(())
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("request", &self.request)
            .field("completed", &self.is_completed())
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
