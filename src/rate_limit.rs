//! Rate-limit tracking from response headers.
//!
//! Every HTTP response from the API carries `X-RateLimit-Limit`,
//! `X-RateLimit-Remaining` and `X-RateLimit-Reset`. The client keeps the most
//! recent snapshot and can push each new one to a callback.

use arc_swap::ArcSwap;
use http::HeaderMap;
use std::fmt;
use std::sync::Arc;

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// A rate-limit snapshot reported by the API.
///
/// Fields are zero when the corresponding header is missing or not a
/// non-negative integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests allowed in the current window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// Seconds until the window resets.
    pub reset_seconds: u64,
}

impl RateLimitInfo {
    /// Extracts the snapshot from response headers.
    ///
    /// # Examples
    ///
    /// ```
    /// use sec4dev::RateLimitInfo;
    /// use http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-ratelimit-limit", "1000".parse().unwrap());
    /// headers.insert("x-ratelimit-remaining", "999".parse().unwrap());
    ///
    /// let info = RateLimitInfo::from_headers(&headers);
    /// assert_eq!(info.limit, 1000);
    /// assert_eq!(info.remaining, 999);
    /// assert_eq!(info.reset_seconds, 0);
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: header_u64(headers, LIMIT_HEADER),
            remaining: header_u64(headers, REMAINING_HEADER),
            reset_seconds: header_u64(headers, RESET_HEADER),
        }
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> u64 {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Callback invoked with every new rate-limit snapshot.
pub type RateLimitCallback = Arc<dyn Fn(RateLimitInfo) + Send + Sync>;

/// Holds the latest snapshot shared by every call on one client.
///
/// Concurrent calls overwrite each other; the last write wins.
pub(crate) struct RateLimitTracker {
    latest: ArcSwap<RateLimitInfo>,
    callback: Option<RateLimitCallback>,
}

impl RateLimitTracker {
    pub(crate) fn new(callback: Option<RateLimitCallback>) -> Self {
        Self {
            latest: ArcSwap::from_pointee(RateLimitInfo::default()),
            callback,
        }
    }

    /// Stores `info` and runs the callback, if any, on the calling task.
    pub(crate) fn record(&self, info: RateLimitInfo) {
        self.latest.store(Arc::new(info));
        tracing::trace!(
            limit = info.limit,
            remaining = info.remaining,
            reset_seconds = info.reset_seconds,
            "Rate limit updated"
        );
        if let Some(callback) = &self.callback {
            callback(info);
        }
    }

    pub(crate) fn latest(&self) -> RateLimitInfo {
        **self.latest.load()
    }
}

impl fmt::Debug for RateLimitTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitTracker")
            .field("latest", &self.latest())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use std::sync::Mutex;

    #[test]
    fn test_from_headers_all_present() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("1000"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("42"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("3600"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(
            info,
            RateLimitInfo {
                limit: 1000,
                remaining: 42,
                reset_seconds: 3600,
            }
        );
    }

    #[test]
    fn test_from_headers_missing_defaults_to_zero() {
        let info = RateLimitInfo::from_headers(&HeaderMap::new());
        assert_eq!(info, RateLimitInfo::default());
    }

    #[test]
    fn test_from_headers_non_numeric_defaults_to_zero() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("lots"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("-5"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("12"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.limit, 0);
        assert_eq!(info.remaining, 0);
        assert_eq!(info.reset_seconds, 12);
    }

    #[test]
    fn test_tracker_records_and_notifies() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let tracker = RateLimitTracker::new(Some(Arc::new(move |info: RateLimitInfo| {
            seen_clone.lock().unwrap().push(info);
        })));

        assert_eq!(tracker.latest(), RateLimitInfo::default());

        let first = RateLimitInfo {
            limit: 10,
            remaining: 9,
            reset_seconds: 60,
        };
        let second = RateLimitInfo {
            limit: 10,
            remaining: 8,
            reset_seconds: 59,
        };
        tracker.record(first);
        tracker.record(second);

        assert_eq!(tracker.latest(), second);
        assert_eq!(*seen.lock().unwrap(), vec![first, second]);
    }
}
