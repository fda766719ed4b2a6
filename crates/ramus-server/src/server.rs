//! HTTP host adapter.
//!
//! The server accepts HTTP/1.1 connections with Hyper and Tokio, converts
//! each request for routing, evaluates the route tree on the blocking pool
//! and writes the outcome back.
//!
//! # Example
//!
//! ```rust,no_run
//! use ramus_router::{complete, get, path};
//! use ramus_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ramus_server::ServerError> {
//!     let root = get([path("", [complete("This is the main page!")])]);
//!     Server::new(ServerConfig::default(), root).run().await
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use ramus_core::{CancelHandle, Rejection, RejectionReason, Request, RequestContext, Response};
use ramus_router::{Route, Router};

use crate::config::{ConfigError, ServerConfig};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = http::Response<ResponseBody>;

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that was requested.
        addr: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error on the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serves a route tree over HTTP.
#[derive(Debug, Clone)]
pub struct Server {
    config: ServerConfig,
    router: Router,
}

impl Server {
    /// Creates a server for a route tree.
    #[must_use]
    pub fn new(config: ServerConfig, root: Route) -> Self {
        Self::with_router(config, Router::new(root))
    }

    /// Creates a server for an existing router.
    #[must_use]
    pub fn with_router(config: ServerConfig, router: Router) -> Self {
        Self { config, router }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Binds the listener without accepting connections yet.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the configuration is invalid or the address
    /// cannot be bound.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        self.config.validate()?;

        let listener = TcpListener::bind((self.config.host(), self.config.port()))
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.config.addr(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        tracing::info!(%local_addr, "server listening");

        Ok(BoundServer {
            listener,
            local_addr,
            router: self.router,
            shutdown_timeout: self.config.shutdown_timeout(),
        })
    }

    /// Serves until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the server cannot bind.
    pub async fn run(self) -> Result<(), ServerError> {
        let bound = self.bind().await?;
        bound.serve(ShutdownSignal::with_os_signals()).await
    }
}

/// A server whose listener is bound.
#[derive(Debug)]
pub struct BoundServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
    shutdown_timeout: Duration,
}

impl BoundServer {
    /// Returns the address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections until `shutdown` triggers, then waits up to the
    /// configured timeout for open connections to finish.
    ///
    /// # Errors
    ///
    /// Accept failures are logged, not returned; the result is reserved for
    /// failures that end the accept loop.
    pub async fn serve(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = self.listener.accept() => match result {
                    Ok((stream, remote_addr)) => {
                        let router = self.router.clone();
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(err) = serve_connection(router, stream, remote_addr, shutdown).await {
                                tracing::debug!(%remote_addr, error = %err, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "failed to accept connection");
                    }
                },

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, stopping server");
                    break;
                }
            }
        }

        tracing::info!(
            timeout = ?self.shutdown_timeout,
            active = tracker.active_connections(),
            "waiting for connections to close"
        );

        tokio::select! {
            () = tracker.wait_for_idle() => {
                tracing::info!("all connections closed");
            }
            () = tokio::time::sleep(self.shutdown_timeout) => {
                tracing::warn!(
                    active = tracker.active_connections(),
                    "shutdown timeout reached with connections still open"
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }
}

/// Serves a route tree on `host:port` until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns [`ServerError`] if the server cannot bind.
pub async fn run(host: &str, port: u16, root: Route) -> Result<(), ServerError> {
    let config = ServerConfig::builder().host(host).port(port).build();
    Server::new(config, root).run().await
}

async fn serve_connection(
    router: Router,
    stream: TcpStream,
    remote_addr: SocketAddr,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req: http::Request<Incoming>| {
        let router = router.clone();
        async move { Ok::<_, Infallible>(handle_request(router, req).await) }
    });

    let conn = http1::Builder::new().serve_connection(io, service);

    tokio::select! {
        result = conn => result,
        () = shutdown.recv() => {
            tracing::debug!(%remote_addr, "connection closed due to shutdown");
            Ok(())
        }
    }
}

/// Cancels the request context if the response future is dropped first.
struct CancelOnDrop(Option<CancelHandle>);

impl CancelOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            tracing::debug!("client went away, cancelling request");
            handle.cancel();
        }
    }
}

async fn handle_request(router: Router, req: http::Request<Incoming>) -> HttpResponse {
    let (parts, _body) = req.into_parts();

    let request = match Request::from_parts(parts.method, &parts.uri, &parts.headers) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(error = %err, "unroutable request");
            return to_http(
                Response::text("The request could not be understood.")
                    .with_status(StatusCode::BAD_REQUEST),
            );
        }
    };

    let mut ctx = RequestContext::new(request);
    let guard = CancelOnDrop(Some(ctx.cancel_handle()));

    let evaluated = tokio::task::spawn_blocking(move || router.evaluate_context(&mut ctx)).await;
    guard.disarm();

    let response = match evaluated {
        Ok(outcome) => outcome.into_response(),
        Err(err) => {
            tracing::error!(error = %err, "route evaluation panicked");
            Rejection::single(RejectionReason::HandlerError {
                message: err.to_string(),
            })
            .to_response()
        }
    };

    to_http(response)
}

fn to_http(response: Response) -> HttpResponse {
    let mut http = http::Response::new(Full::new(response.body().clone()));
    *http.status_mut() = response.status();

    let headers = http.headers_mut();
    for (name, value) in response.headers() {
        headers.insert(name.clone(), value.clone());
    }
    if let Some(value) = response
        .content_type()
        .and_then(|content_type| HeaderValue::from_str(content_type).ok())
    {
        headers.insert(CONTENT_TYPE, value);
    }

    http
}
