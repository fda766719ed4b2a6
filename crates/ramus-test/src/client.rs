//! Test client for in-memory route evaluation.

use http::Method;
use ramus_core::{Request, RequestBuilder};
use ramus_router::{Route, Router};

use crate::error::TestError;
use crate::response::TestResponse;

/// A client that evaluates requests directly against a route tree.
///
/// # Example
///
/// ```
/// use ramus_router::{complete, get, path};
/// use ramus_test::TestClient;
///
/// let client = TestClient::new(get([path("hello", [complete("hi")])]));
/// assert_eq!(client.get("/hello").send().text().unwrap(), "hi");
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    router: Router,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for a route tree.
    pub fn new(root: Route) -> Self {
        Self::from_router(Router::new(root))
    }

    /// Creates a client for an existing router.
    pub fn from_router(router: Router) -> Self {
        Self {
            router,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the router under test.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Creates an OPTIONS request builder.
    pub fn options(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, uri)
    }

    /// Creates a HEAD request builder.
    pub fn head(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::HEAD, uri)
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl Into<String>) -> TestClientRequest<'_> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        TestClientRequest {
            client: self,
            builder,
        }
    }
}

/// A request builder bound to a test client.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: RequestBuilder,
}

impl TestClientRequest<'_> {
    /// Sets a header on the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the `Accept` header.
    pub fn accept(self, media_ranges: impl Into<String>) -> Self {
        self.header("accept", media_ranges)
    }

    /// Evaluates the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built; use [`try_send`](Self::try_send)
    /// to test malformed requests.
    pub fn send(self) -> TestResponse {
        match self.try_send() {
            Ok(response) => response,
            Err(err) => panic!("test request could not be sent: {err}"),
        }
    }

    /// Evaluates the request, returning build failures.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::RequestBuild`] if the URI or query is invalid.
    pub fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        Ok(TestResponse::from_outcome(self.client.router.evaluate(request)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use ramus_core::{HandlerError, JsonMarshaller, RejectionReason, RequestContext};
    use ramus_router::{complete, get, handle, method, path};

    fn echo_method(ctx: &mut RequestContext) -> Result<(), HandlerError> {
        let method = ctx.request().method().to_string();
        ctx.complete(method)?;
        Ok(())
    }

    fn echo_header(ctx: &mut RequestContext) -> Result<(), HandlerError> {
        let value = ctx.request().header("x-custom").unwrap_or("none").to_string();
        ctx.complete(value)?;
        Ok(())
    }

    #[test]
    fn test_all_methods() {
        let methods = [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
        ];
        let client = TestClient::new(path(
            "echo",
            methods.iter().map(|m| method(m.clone(), [handle(echo_method)])),
        ));

        assert_eq!(client.get("/echo").send().text().unwrap(), "GET");
        assert_eq!(client.post("/echo").send().text().unwrap(), "POST");
        assert_eq!(client.put("/echo").send().text().unwrap(), "PUT");
        assert_eq!(client.patch("/echo").send().text().unwrap(), "PATCH");
        assert_eq!(client.delete("/echo").send().text().unwrap(), "DELETE");
        assert_eq!(client.options("/echo").send().text().unwrap(), "OPTIONS");
        assert_eq!(client.head("/echo").send().text().unwrap(), "HEAD");
    }

    #[test]
    fn test_headers() {
        let client = TestClient::new(handle(echo_header));
        assert_eq!(client.get("/").send().text().unwrap(), "none");
        assert_eq!(
            client.get("/").header("X-Custom", "given").send().text().unwrap(),
            "given"
        );

        let client = client.with_default_header("x-custom", "default-value");
        assert_eq!(client.get("/").send().text().unwrap(), "default-value");
    }

    #[test]
    fn test_accept_negotiation() {
        let client = TestClient::new(handle(|ctx: &mut RequestContext| -> Result<(), HandlerError> {
            ctx.complete_with(&serde_json::json!({"amount": 5}), &JsonMarshaller)?;
            Ok(())
        }));

        let response = client.get("/").accept("application/json").send();
        response
            .assert_status(StatusCode::OK)
            .assert_content_type("application/json");
        assert_eq!(response.json_value().unwrap()["amount"], 5);

        let response = client.get("/").accept("text/html").send();
        response.assert_status(StatusCode::NOT_ACCEPTABLE);
        assert!(matches!(
            response.rejection().and_then(|r| r.primary()),
            Some(RejectionReason::UnacceptableContent { .. })
        ));
    }

    #[test]
    fn test_invalid_uri_is_reported() {
        let client = TestClient::new(get([complete("x")]));
        let err = client.get("http://[::1").try_send().unwrap_err();
        assert!(matches!(err, TestError::RequestBuild(_)));
    }
}
