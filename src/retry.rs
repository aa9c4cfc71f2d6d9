//! Retry policies for transient failures.
//!
//! Two waits are kept apart. Generic retryable failures (network
//! errors, timeouts, 5xx) use [`RetryPolicy::backoff_delay`], exponential with
//! jitter. A 429 waits for whatever the server asked for through
//! `Retry-After`, see [`retry_after`].

use http::HeaderMap;
use rand::Rng;
use std::time::{Duration, SystemTime};

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRIES: usize = 3;

/// Default base delay of the exponential backoff.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Wait used for a 429 without a usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Upper bound of the random jitter added to each backoff, in milliseconds.
pub const MAX_JITTER_MS: u64 = 100;

/// Status codes worth repeating a request for.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Returns `true` if a response with this status may succeed when repeated.
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Bounded exponential backoff.
///
/// # Examples
///
/// ```
/// use sec4dev::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(100));
/// assert_eq!(policy.max_attempts(), 4);
///
/// // 100ms * 2^2 plus up to 100ms of jitter
/// let delay = policy.backoff_delay(2);
/// assert!(delay >= Duration::from_millis(400));
/// assert!(delay <= Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Delay before the first retry, doubled for each one after.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_RETRIES,
            base_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a new `RetryPolicy`.
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total attempts allowed, the first one included.
    pub fn max_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }

    /// Returns `true` if another attempt may follow the zero-indexed `attempt`.
    pub fn has_attempts_left(&self, attempt: usize) -> bool {
        attempt < self.max_retries
    }

    /// Delay before retrying after the zero-indexed `attempt` failed.
    ///
    /// `base_delay * 2^attempt` plus a uniform jitter of 0 to 100ms.
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let jitter = rand::thread_rng().gen_range(0..=MAX_JITTER_MS);
        self.exponential_delay(attempt)
            .saturating_add(Duration::from_millis(jitter))
    }

    fn exponential_delay(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt).unwrap_or(u32::MAX);
        let multiplier = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(multiplier)
    }
}

/// Seconds to wait after a 429, as requested by the server.
///
/// Accepts delay-seconds or an HTTP-date. Missing, zero, past or malformed
/// values fall back to [`DEFAULT_RETRY_AFTER_SECS`].
///
/// # Examples
///
/// ```
/// use sec4dev::retry::retry_after;
/// use http::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// assert_eq!(retry_after(&headers), 60);
///
/// headers.insert("retry-after", "5".parse().unwrap());
/// assert_eq!(retry_after(&headers), 5);
/// ```
pub fn retry_after(headers: &HeaderMap) -> u64 {
    parse_retry_after(headers)
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    let header = headers.get("retry-after")?.to_str().ok()?.trim();

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(seconds);
    }

    let date = httpdate::parse_http_date(header).ok()?;
    let wait = date.duration_since(SystemTime::now()).ok()?;
    // round up so a date less than a second away still waits
    Some(wait.as_secs() + u64::from(wait.subsec_nanos() > 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));

        assert_eq!(policy.exponential_delay(0), Duration::from_millis(100));
        assert_eq!(policy.exponential_delay(1), Duration::from_millis(200));
        assert_eq!(policy.exponential_delay(2), Duration::from_millis(400));
        assert_eq!(policy.exponential_delay(3), Duration::from_millis(800));
        assert_eq!(policy.exponential_delay(4), Duration::from_millis(1600));
    }

    #[test]
    fn test_backoff_jitter_bounds() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        for _ in 0..100 {
            let delay = policy.backoff_delay(1);
            assert!(delay >= Duration::from_millis(2000));
            assert!(delay <= Duration::from_millis(2100));
        }
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::new(usize::MAX, Duration::from_secs(1));
        assert!(policy.backoff_delay(200) >= Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn test_attempt_accounting() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));
        assert_eq!(policy.max_attempts(), 3);
        assert!(policy.has_attempts_left(0));
        assert!(policy.has_attempts_left(1));
        assert!(!policy.has_attempts_left(2));

        let no_retry = RetryPolicy::new(0, Duration::from_millis(1));
        assert_eq!(no_retry.max_attempts(), 1);
        assert!(!no_retry.has_attempts_left(0));
    }

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [429, 500, 502, 503, 504] {
            assert!(is_retryable_status(status), "{} should retry", status);
        }
        for status in [400, 401, 402, 403, 404, 422, 501, 505] {
            assert!(!is_retryable_status(status), "{} should not retry", status);
        }
    }

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("30"));
        assert_eq!(retry_after(&headers), 30);
    }

    #[test]
    fn test_retry_after_defaults() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER_SECS);

        headers.insert("retry-after", HeaderValue::from_static("0"));
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER_SECS);

        headers.insert("retry-after", HeaderValue::from_static("-3"));
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER_SECS);

        headers.insert("retry-after", HeaderValue::from_static("soon"));
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER_SECS);
    }

    #[test]
    fn test_retry_after_http_date() {
        let future = SystemTime::now() + Duration::from_secs(120);
        let mut headers = HeaderMap::new();
        headers.insert(
            "retry-after",
            HeaderValue::from_str(&httpdate::fmt_http_date(future)).unwrap(),
        );

        let secs = retry_after(&headers);
        assert!((118..=121).contains(&secs), "got {}", secs);
    }

    #[test]
    fn test_retry_after_past_date_defaults() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "retry-after",
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER_SECS);
    }
}
