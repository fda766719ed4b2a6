//! Request types.
//!
//! A [`Request`] is the routing view of an incoming HTTP request: the method,
//! the path split into segments, the query string as a first-value map and
//! the headers keyed by lowercased name.
//!
//! Path segments and query values are both percent-decoded. The path is
//! split on `/` before decoding, so an encoded `%2F` stays inside its
//! segment.

use std::borrow::Cow;
use std::collections::HashMap;

use http::{HeaderMap, Method, Uri};

use crate::error::InvalidRequest;

/// An incoming request as seen by the route evaluator.
///
/// # Example
///
/// ```
/// use ramus_core::Request;
/// use http::Method;
///
/// let request = Request::builder()
///     .method(Method::GET)
///     .uri("/query?amount=5&amount=7")
///     .header("X-Trace", "abc")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.segments(), ["query"]);
/// assert_eq!(request.query("amount"), Some("5"));
/// assert_eq!(request.header("x-trace"), Some("abc"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    segments: Vec<String>,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
}

impl Request {
    /// Creates a new request builder.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Builds a request from the parts of an `http` request.
    ///
    /// Header values that are not visible ASCII are skipped.
    pub fn from_parts(method: Method, uri: &Uri, headers: &HeaderMap) -> Result<Self, InvalidRequest> {
        let query = match uri.query() {
            Some(raw) => parse_query(raw)?,
            None => HashMap::new(),
        };

        let headers = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        Ok(Self {
            method,
            segments: split_path(uri.path())?,
            query,
            headers,
        })
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the non-empty path segments in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the path segments joined by `/`, without leading or trailing slash.
    ///
    /// The root path yields the empty string.
    #[must_use]
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Returns the first value of a query parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Returns the query parameters (first value per name).
    #[must_use]
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Returns a header value; the lookup is case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the media ranges listed in the `Accept` header.
    ///
    /// Parameters such as `q=0.8` are dropped. A missing header yields an
    /// empty list, which marshallers treat as "anything is acceptable".
    #[must_use]
    pub fn accepted_types(&self) -> Vec<String> {
        self.header("accept")
            .map(|accept| {
                accept
                    .split(',')
                    .filter_map(|range| {
                        let media = range.split(';').next().unwrap_or_default().trim();
                        (!media.is_empty()).then(|| media.to_ascii_lowercase())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Builder for [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    uri: Option<String>,
    headers: Vec<(String, String)>,
}

impl RequestBuilder {
    /// Sets the HTTP method. Defaults to `GET`.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the request target (path and optional query). Defaults to `/`.
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builds the request.
    pub fn build(self) -> Result<Request, InvalidRequest> {
        let raw = self.uri.unwrap_or_else(|| "/".to_string());
        let uri: Uri = raw.parse().map_err(|_| InvalidRequest::Uri(raw.clone()))?;

        let mut request = Request::from_parts(self.method.unwrap_or(Method::GET), &uri, &HeaderMap::new())?;
        for (name, value) in self.headers {
            request.headers.insert(name.to_ascii_lowercase(), value);
        }
        Ok(request)
    }
}

fn split_path(path: &str) -> Result<Vec<String>, InvalidRequest> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(segment)
                .map(Cow::into_owned)
                .map_err(|_| InvalidRequest::Path(segment.to_string()))
        })
        .collect()
}

fn parse_query(raw: &str) -> Result<HashMap<String, String>, InvalidRequest> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(raw).map_err(|e| InvalidRequest::Query(e.to_string()))?;

    let mut query = HashMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        query.entry(name).or_insert(value);
    }
    Ok(query)
}
