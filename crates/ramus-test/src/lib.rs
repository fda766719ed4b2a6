//! # Ramus Test
//!
//! In-memory testing for Ramus route trees: requests are evaluated directly
//! against the tree, with no network or runtime involved.
//!
//! ## Key Features
//!
//! - **Request Builder**: method shortcuts, headers and `Accept` negotiation
//! - **Response Assertions**: chainable `assert_*` helpers
//! - **Outcome Inspection**: the [`Rejection`](ramus_core::Rejection) behind
//!   every non-2xx response
//!
//! ## Example
//!
//! ```
//! use ramus_router::{complete, get, path};
//! use ramus_test::TestClient;
//! use http::StatusCode;
//!
//! let client = TestClient::new(get([path("", [complete("This is the main page!")])]));
//!
//! client
//!     .get("/")
//!     .send()
//!     .assert_status(StatusCode::OK)
//!     .assert_body_eq("This is the main page!");
//!
//! let response = client.post("/").send();
//! response.assert_status(StatusCode::METHOD_NOT_ALLOWED).assert_header("allow", "GET");
//! assert!(response.rejection().is_some());
//! ```

#![doc(html_root_url = "https://docs.rs/ramus-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use response::TestResponse;
