//! Handler trait for request processing.
//!
//! A [`Handler`] decides the response by calling `complete` on the
//! [`RequestContext`] at most once. It returns nothing on success; extraction
//! and completion failures propagate with `?`.

use crate::context::RequestContext;
use crate::error::HandlerError;

/// User code invoked by a `handle` route.
///
/// Handlers run synchronously on the thread evaluating the request and may
/// block. Any `Fn(&mut RequestContext) -> Result<(), HandlerError>` closure is
/// a handler.
///
/// # Example
///
/// ```
/// use ramus_core::{Handler, HandlerError, Request, RequestContext};
///
/// struct Greeter;
///
/// impl Handler for Greeter {
///     fn handle(&self, ctx: &mut RequestContext) -> Result<(), HandlerError> {
///         let name = ctx.request().query("name").unwrap_or("world").to_string();
///         ctx.complete(format!("hello, {name}"))?;
///         Ok(())
///     }
/// }
///
/// let mut ctx = RequestContext::new(Request::builder().uri("/?name=ramus").build().unwrap());
/// Greeter.handle(&mut ctx).unwrap();
/// assert_eq!(ctx.response().unwrap().body_str(), Some("hello, ramus"));
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handles one request.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] if:
    /// - A required parameter is absent or malformed
    /// - A completion is refused
    /// - The handler fails internally
    fn handle(&self, ctx: &mut RequestContext) -> Result<(), HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&mut RequestContext) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut RequestContext) -> Result<(), HandlerError> {
        self(ctx)
    }
}
