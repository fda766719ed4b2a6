//! Composable route trees for Ramus.
//!
//! A route tree is built from nested combinators. Guards narrow the request
//! by method or path and try their children in order; terminals produce the
//! response.
//!
//! - **Guards**: [`get`], [`post`], [`put`], [`delete`], [`patch`], [`head`],
//!   [`options`], [`method`], [`path`]
//! - **Terminals**: [`handle`], [`complete`]
//!
//! # Example
//!
//! ```rust
//! use ramus_router::{complete, get, handle, path, Router};
//! use ramus_core::{HandlerError, Request, RequestContext};
//! use ramus_extract::int_parameter;
//! use http::StatusCode;
//!
//! fn query(ctx: &mut RequestContext) -> Result<(), HandlerError> {
//!     let amount = int_parameter("amount").get(ctx)?;
//!     ctx.complete(format!("The amount was {amount}"))?;
//!     Ok(())
//! }
//!
//! let router = Router::new(get([
//!     path("", [complete("This is the main page!")]),
//!     path("query", [handle(query)]),
//! ]));
//!
//! let request = Request::builder().uri("/query?amount=5").build().unwrap();
//! let response = router.evaluate(request).into_response();
//! assert_eq!(response.body_str(), Some("The amount was 5"));
//!
//! let request = Request::builder().uri("/query").build().unwrap();
//! assert_eq!(router.evaluate(request).into_response().status(), StatusCode::BAD_REQUEST);
//! ```
//!
//! # Evaluation
//!
//! ```text
//!                 get
//!                  │
//!          ┌───────┴────────┐
//!          │                │
//!       path("")      path("query")
//!          │                │
//!   complete(...)     handle(query)
//! ```
//!
//! Children are tried left to right and the first one that completes wins.
//! When all decline, their reasons are merged and the most specific one
//! decides the status. A handler error or a cancellation stops evaluation
//! at once.

#![doc(html_root_url = "https://docs.rs/ramus-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod route;
mod router;

pub use route::{
    complete, delete, get, handle, head, method, options, patch, path, post, put, Route,
    SharedHandler,
};
pub use router::{Outcome, Router};
