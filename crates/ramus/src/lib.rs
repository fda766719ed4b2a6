//! # Ramus
//!
//! **A composable routing DSL for HTTP services**
//!
//! A Ramus service is a tree of small route values:
//!
//! - **Guards** narrow the request by method ([`get`](router::get), ...) or
//!   path ([`path`](router::path)) and try their children in order
//! - **Terminals** respond, either with fixed text ([`complete`](router::complete))
//!   or by running user code ([`handle`](router::handle))
//! - **Extractions** pull typed, memoized values out of the request inside
//!   a handler ([`int_parameter`](extract::int_parameter), ...)
//!
//! When no branch completes, the most specific reason any branch gave
//! decides the status: 400 for a bad parameter beats 404 for an unknown
//! path, which beats 405 for a wrong method.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ramus::prelude::*;
//!
//! fn query(ctx: &mut RequestContext) -> Result<(), HandlerError> {
//!     let amount = int_parameter("amount").get(ctx)?;
//!     ctx.complete(format!("The amount was {amount}"))?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ServerError> {
//!     let root = get([
//!         path("", [complete("This is the main page!")]),
//!         path("query", [handle(query)]),
//!     ]);
//!
//!     ramus::run("localhost", 8080, root).await
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ramus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use ramus_core as core;

// Re-export extraction types
pub use ramus_extract as extract;

// Re-export route combinators and the evaluator
pub use ramus_router as router;

// Re-export the host adapter
pub use ramus_server as server;

// Re-export logging setup
pub use ramus_telemetry as telemetry;

pub use ramus_server::run;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use ramus::prelude::*;
///
/// let root = get([path("", [complete("home")])]);
/// let outcome = Router::new(root).evaluate(Request::builder().build().unwrap());
/// assert!(outcome.is_completed());
/// ```
pub mod prelude {
    pub use ramus_core::{
        CompletionError, ExtractionError, Handler, HandlerError, JsonMarshaller, Marshaller,
        Rejection, RejectionReason, Request, RequestContext, Response, TextMarshaller,
    };

    pub use ramus_extract::{
        header, int_parameter, optional, parameter, path_segment, Extraction,
    };

    pub use ramus_router::{
        complete, delete, get, handle, head, method, options, patch, path, post, put, Outcome,
        Route, Router,
    };

    pub use ramus_server::{Server, ServerConfig, ServerError};

    pub use ramus_telemetry::{init_logging, LogConfig};
}
