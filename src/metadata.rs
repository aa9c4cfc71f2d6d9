//! Request metadata and the raw outcome of a single attempt.

use http::{HeaderMap, Method, StatusCode};

/// Metadata for an individual HTTP request.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method. Every Sec4Dev endpoint uses POST.
    pub method: Method,

    /// The request path, appended to the client's base URL.
    pub path: String,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// Shorthand for a POST to `path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }
}

/// What one attempt received, before any status handling.
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub(crate) status: StatusCode,
    pub(crate) body: Vec<u8>,
    pub(crate) headers: HeaderMap,
}

impl RawResponse {
    /// The body as text, replacing invalid UTF-8.
    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
