//! # Ramus Extract
//!
//! Typed extractions for the Ramus routing DSL.
//!
//! An [`Extraction<T>`] is a named projection from a request to a `T`. It is
//! built once by a factory function and reused across requests; inside a
//! handler it is evaluated against the [`RequestContext`](ramus_core::RequestContext),
//! which memoizes the result.
//!
//! | Factory | Source | Output |
//! |---------|--------|--------|
//! | [`int_parameter`] | query string | `i64` |
//! | [`parameter`] | query string | `String` |
//! | [`header`] | headers | `String` |
//! | [`path_segment`] | path | `String` |
//! | [`Extraction::custom`] | any | user-defined |
//!
//! Failures are [`ExtractionError`](ramus_core::ExtractionError)s of kind
//! *required* (absent) or *malformed* (unparseable). Propagated from a handler
//! with `?`, they become a `MissingParameter` rejection and a `400 Bad Request`
//! if no sibling route matches.
//!
//! ## Example
//!
//! ```rust
//! use ramus_extract::int_parameter;
//! use ramus_core::{HandlerError, RequestContext};
//!
//! let amount = int_parameter("amount");
//!
//! let handler = move |ctx: &mut RequestContext| -> Result<(), HandlerError> {
//!     let val = amount.get(ctx)?;
//!     ctx.complete(format!("The value is {val}. It's square is {}", val * val))?;
//!     Ok(())
//! };
//! # let _ = handler;
//! ```

#![doc(html_root_url = "https://docs.rs/ramus-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod extraction;
mod header;
mod path;
mod query;

pub use extraction::{optional, Extraction, Optional};
pub use header::header;
pub use path::path_segment;
pub use query::{int_parameter, parameter};
