//! Response wrapper that keeps per-call details next to the decoded result.
//!
//! The [`Response`] type carries the rate-limit snapshot observed by *this*
//! call. Reading [`Client::rate_limit`](crate::Client::rate_limit) afterwards may
//! already show a snapshot written by a concurrent call.

use crate::RateLimitInfo;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful API response.
///
/// Derefs to the decoded data, so result fields are reachable directly.
///
/// # Examples
///
/// ```no_run
/// use sec4dev::Client;
///
/// # async fn example() -> Result<(), sec4dev::Error> {
/// let client = Client::new("sec4_your_key")?;
///
/// let response = client.email().check("user@tempmail.com").await?;
///
/// println!("Disposable: {}", response.is_disposable);
/// println!("Requests left: {}", response.rate_limit.remaining);
/// println!("Attempts: {}", response.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The deserialized response data.
    pub data: T,

    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The rate-limit snapshot reported with this response.
    pub rate_limit: RateLimitInfo,

    /// Time from the first attempt until the successful response, retries included.
    pub latency: Duration,

    /// The number of attempts made, `1` when the first one succeeded.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Consumes the response, returning the decoded data.
    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
