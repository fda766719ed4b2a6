//! Route tree nodes and the combinators that build them.
//!
//! Guards ([`get`], [`path`], ...) wrap an ordered list of children;
//! terminals ([`handle`], [`complete`]) produce the response. A tree is an
//! immutable value: cloning it is cheap and shares the children.

use std::fmt;
use std::sync::Arc;

use http::Method;
use ramus_core::Handler;

/// A handler shared by every clone of the route that holds it.
///
/// Two `SharedHandler`s are equal when they point at the same handler
/// instance.
#[derive(Clone)]
pub struct SharedHandler(Arc<dyn Handler>);

impl SharedHandler {
    /// Wraps a handler.
    pub fn new(handler: impl Handler) -> Self {
        Self(Arc::new(handler))
    }

    /// Returns the wrapped handler.
    #[must_use]
    pub fn handler(&self) -> &dyn Handler {
        self.0.as_ref()
    }
}

impl PartialEq for SharedHandler {
    fn eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.0).cast::<()>() == Arc::as_ptr(&other.0).cast::<()>()
    }
}

impl Eq for SharedHandler {}

impl fmt::Debug for SharedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedHandler({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}

/// A node in a route tree.
///
/// # Example
///
/// ```
/// use ramus_router::{complete, get, path, Route};
///
/// let a = get([path("", [complete("home")])]);
/// let b = get([path("/", [complete("home")])]);
/// assert_eq!(a, b);
/// assert_eq!(a.children().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Matches when the request method equals `method`.
    Method {
        /// The accepted method.
        method: Method,
        /// Children tried in order.
        children: Arc<[Route]>,
    },

    /// Matches when the remaining path equals `pattern`.
    Path {
        /// Normalized pattern: segments joined by `/`, no surrounding slashes.
        pattern: Arc<str>,
        /// Children tried in order.
        children: Arc<[Route]>,
    },

    /// Invokes a handler.
    Handle(SharedHandler),

    /// Responds `200 OK` with a literal text body.
    Complete(Arc<str>),
}

impl Route {
    /// Returns the children of a guard; terminals have none.
    #[must_use]
    pub fn children(&self) -> &[Route] {
        match self {
            Self::Method { children, .. } | Self::Path { children, .. } => children,
            Self::Handle(_) | Self::Complete(_) => &[],
        }
    }

    /// Returns `true` for `Handle` and `Complete` nodes.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Handle(_) | Self::Complete(_))
    }
}

/// Guards children with an arbitrary method.
pub fn method(method: Method, inner: impl IntoIterator<Item = Route>) -> Route {
    Route::Method {
        method,
        children: inner.into_iter().collect(),
    }
}

/// Guards children with `GET`.
pub fn get(inner: impl IntoIterator<Item = Route>) -> Route {
    method(Method::GET, inner)
}

/// Guards children with `POST`.
pub fn post(inner: impl IntoIterator<Item = Route>) -> Route {
    method(Method::POST, inner)
}

/// Guards children with `PUT`.
pub fn put(inner: impl IntoIterator<Item = Route>) -> Route {
    method(Method::PUT, inner)
}

/// Guards children with `DELETE`.
pub fn delete(inner: impl IntoIterator<Item = Route>) -> Route {
    method(Method::DELETE, inner)
}

/// Guards children with `PATCH`.
pub fn patch(inner: impl IntoIterator<Item = Route>) -> Route {
    method(Method::PATCH, inner)
}

/// Guards children with `HEAD`.
pub fn head(inner: impl IntoIterator<Item = Route>) -> Route {
    method(Method::HEAD, inner)
}

/// Guards children with `OPTIONS`.
pub fn options(inner: impl IntoIterator<Item = Route>) -> Route {
    method(Method::OPTIONS, inner)
}

/// Guards children with a literal match on the whole remaining path.
///
/// Empty segments in `pattern` are dropped, so `""`, `"/"` and `"//"` all
/// match the root, and `"/query/"` equals `"query"`.
pub fn path(pattern: &str, inner: impl IntoIterator<Item = Route>) -> Route {
    Route::Path {
        pattern: Arc::from(normalize(pattern)),
        children: inner.into_iter().collect(),
    }
}

/// Terminal that invokes a handler.
pub fn handle(handler: impl Handler) -> Route {
    Route::Handle(SharedHandler::new(handler))
}

/// Terminal that responds `200 OK`, `text/plain; charset=utf-8` with `text`.
pub fn complete(text: impl Into<String>) -> Route {
    Route::Complete(Arc::from(text.into()))
}

fn normalize(pattern: &str) -> String {
    pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
