//! # Ramus Server
//!
//! HTTP host adapter for Ramus route trees.
//!
//! This crate connects a route tree to the network:
//!
//! - HTTP/1.1 via Hyper
//! - Route evaluation on Tokio's blocking pool, cancelled when the client
//!   goes away
//! - Graceful shutdown on SIGINT / SIGTERM
//! - [`ServerConfig`] loadable from TOML
//!
//! ## Example
//!
//! ```rust,no_run
//! use ramus_router::{complete, get, path};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ramus_server::ServerError> {
//!     let root = get([path("", [complete("This is the main page!")])]);
//!     ramus_server::run("localhost", 8080, root).await
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ramus-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod server;
pub mod shutdown;

pub use config::{ConfigError, ServerConfig, ServerConfigBuilder, DEFAULT_HOST, DEFAULT_PORT};
pub use server::{run, BoundServer, HttpResponse, ResponseBody, Server, ServerError};
pub use shutdown::ShutdownSignal;
