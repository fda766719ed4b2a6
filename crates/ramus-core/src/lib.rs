//! # Ramus Core
//!
//! Core types and traits for the Ramus routing DSL.
//!
//! This crate provides the types every other Ramus crate builds on:
//!
//! - [`Request`] / [`Response`] - The routing view of a request and the recorded response
//! - [`RequestContext`] - Per-request state: the request, a single-use response sink and an extraction memo
//! - [`Handler`] - User code invoked by `handle` routes
//! - [`Marshaller`] - Turns typed values into response bodies
//! - [`Extract`] - The seam extractions plug into
//! - [`Rejection`] / [`RejectionReason`] - Why a route tree declined a request

#![doc(html_root_url = "https://docs.rs/ramus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;
pub mod marshal;
mod request;
mod response;

pub use context::{CancelHandle, Extract, ExtractionKey, ParserId, RequestContext, RequestId};
pub use error::{
    CompletionError, ExtractionError, ExtractionSource, HandlerError, InvalidRequest,
    MarshalError, MissingKind, Rejection, RejectionReason, UnacceptableContent,
};
pub use handler::Handler;
pub use marshal::{JsonMarshaller, Marshaller, TextMarshaller};
pub use request::{Request, RequestBuilder};
pub use response::{Response, TEXT_PLAIN_UTF_8};
