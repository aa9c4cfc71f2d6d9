//! Error types for Sec4Dev API calls.
//!
//! API failures form a closed taxonomy keyed by HTTP status code. Every API
//! variant carries the same [`ApiError`] payload (message, status code and the
//! response body), and [`Error::RateLimited`] adds the rate-limit fields reported
//! alongside a 429.

use http::StatusCode;
use std::fmt;

/// Message used when an error body carries no `detail` string.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// The body of an error response, as far as it could be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The body was valid JSON.
    Json(serde_json::Value),
    /// The body was not JSON; the raw bytes are kept as received.
    Raw(Vec<u8>),
}

/// Payload shared by every status-mapped error.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Human-readable message, taken from the `detail` field when present.
    pub message: String,
    /// The HTTP status code, or `0` when no response was involved.
    pub status_code: u16,
    /// The response body. `None` for errors raised before any request was sent.
    pub response_body: Option<ResponseBody>,
}

impl ApiError {
    /// Creates a new `ApiError`.
    pub fn new(
        message: impl Into<String>,
        status_code: u16,
        response_body: Option<ResponseBody>,
    ) -> Self {
        Self {
            message: message.into(),
            status_code,
            response_body,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.message, self.status_code)
    }
}

/// The main error type for Sec4Dev API calls.
///
/// # Examples
///
/// ```no_run
/// use sec4dev::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new("sec4_your_key")?;
///
/// match client.email().check("user@example.com").await {
///     Ok(result) => println!("disposable: {}", result.is_disposable),
///     Err(Error::RateLimited { retry_after, remaining, .. }) => {
///         eprintln!("rate limited, retry in {}s ({} left)", retry_after, remaining);
///     }
///     Err(Error::Authentication(e)) => eprintln!("bad API key: {}", e.message),
///     Err(e) => eprintln!("check failed: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// 401: the API key is missing or invalid.
    #[error("Authentication failed: {0}")]
    Authentication(ApiError),

    /// 402: the account's quota is exhausted.
    #[error("Payment required: {0}")]
    PaymentRequired(ApiError),

    /// 403: the account is deactivated or lacks access.
    #[error("Forbidden: {0}")]
    Forbidden(ApiError),

    /// 404: the endpoint does not exist.
    #[error("Not found: {0}")]
    NotFound(ApiError),

    /// 422, or input rejected before any request was sent.
    #[error("Validation failed: {0}")]
    Validation(ApiError),

    /// 429 after every retry was spent.
    #[error("Rate limited, retry after {retry_after}s: {error}")]
    RateLimited {
        /// The shared error payload.
        error: ApiError,
        /// Seconds the server asked the client to wait.
        retry_after: u64,
        /// Request limit of the current window.
        limit: u64,
        /// Requests left in the current window.
        remaining: u64,
    },

    /// 5xx.
    #[error("Server error: {0}")]
    Server(ApiError),

    /// Any other status of 400 or above.
    #[error("API error: {0}")]
    Api(ApiError),

    /// A network-level error occurred (connection refused, DNS failure, reset, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The transport timed out.
    #[error("Request timed out")]
    Timeout,

    /// The request body could not be serialized to JSON.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// A successful response could not be decoded into the expected type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided or assembled.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The call's [`Context`](crate::Context) was cancelled.
    #[error("Request cancelled")]
    Cancelled,

    /// The call's [`Context`](crate::Context) deadline passed.
    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// Maps an HTTP status to its error kind.
    ///
    /// `retry_after`, `limit` and `remaining` are only kept for 429.
    ///
    /// # Examples
    ///
    /// ```
    /// use sec4dev::Error;
    ///
    /// let err = Error::from_status(402, "Quota exceeded", None, 0, 0, 0);
    /// assert!(matches!(err, Error::PaymentRequired(_)));
    /// assert_eq!(err.status_code(), Some(402));
    /// ```
    pub fn from_status(
        status_code: u16,
        message: impl Into<String>,
        response_body: Option<ResponseBody>,
        retry_after: u64,
        limit: u64,
        remaining: u64,
    ) -> Self {
        let error = ApiError::new(message, status_code, response_body);
        match status_code {
            401 => Error::Authentication(error),
            402 => Error::PaymentRequired(error),
            403 => Error::Forbidden(error),
            404 => Error::NotFound(error),
            422 => Error::Validation(error),
            429 => Error::RateLimited {
                error,
                retry_after,
                limit,
                remaining,
            },
            500..=599 => Error::Server(error),
            _ => Error::Api(error),
        }
    }

    /// A client-side validation failure: status 422, no body.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(ApiError::new(message, 422, None))
    }

    /// Returns the shared payload of status-mapped errors.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Authentication(e)
            | Error::PaymentRequired(e)
            | Error::Forbidden(e)
            | Error::NotFound(e)
            | Error::Validation(e)
            | Error::Server(e)
            | Error::Api(e) => Some(e),
            Error::RateLimited { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::DeserializationFailed { status, .. } => Some(status.as_u16()),
            _ => self.api_error().map(|e| e.status_code),
        }
    }

    /// Returns the API message if this is a status-mapped error.
    pub fn message(&self) -> Option<&str> {
        self.api_error().map(|e| e.message.as_str())
    }

    /// Returns the response body attached to a status-mapped error.
    pub fn response_body(&self) -> Option<&ResponseBody> {
        self.api_error()?.response_body.as_ref()
    }

    /// Returns `true` if repeating the request may succeed.
    ///
    /// Network errors, timeouts, 429 and 500/502/503/504 are retryable.
    ///
    /// # Examples
    ///
    /// ```
    /// use sec4dev::Error;
    ///
    /// assert!(Error::from_status(503, "Unavailable", None, 0, 0, 0).is_retryable());
    /// assert!(!Error::from_status(501, "Not implemented", None, 0, 0, 0).is_retryable());
    /// assert!(!Error::validation("Invalid email format").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) | Error::Timeout => true,
            _ => self
                .api_error()
                .is_some_and(|e| crate::retry::is_retryable_status(e.status_code)),
        }
    }

    /// Returns `true` if the call was stopped by its context.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }
}

/// Extracts the message and body of an error response.
///
/// A JSON object with a string `detail` yields that string as the message;
/// anything else yields [`UNKNOWN_ERROR_MESSAGE`]. Bodies that are not a JSON
/// object are kept as raw bytes.
pub(crate) fn parse_error_body(body: &[u8]) -> (String, ResponseBody) {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) if value.is_object() => {
            let message = value
                .get("detail")
                .and_then(serde_json::Value::as_str)
                .unwrap_or(UNKNOWN_ERROR_MESSAGE)
                .to_string();
            (message, ResponseBody::Json(value))
        }
        _ => (
            UNKNOWN_ERROR_MESSAGE.to_string(),
            ResponseBody::Raw(body.to_vec()),
        ),
    }
}

/// Converts a transport error, keeping timeouts distinct.
pub(crate) fn transport_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout
    } else {
        Error::Network(error)
    }
}

/// A specialized `Result` type for Sec4Dev API calls.
pub type Result<T> = std::result::Result<T, Error>;
