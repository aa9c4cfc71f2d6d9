//! HTTP client with retry logic and rich error handling.
//!
//! The [`Client`] type is the main entry point. Use [`ClientBuilder`] to
//! configure it, or [`Client::new`] for the defaults.

use crate::{
    context::Context,
    email::EmailService,
    error::{parse_error_body, transport_error},
    ip::IpService,
    metadata::{RawResponse, RequestMetadata},
    rate_limit::{RateLimitCallback, RateLimitInfo, RateLimitTracker},
    retry::{self, RetryPolicy},
    ApiError, Error, Response, Result,
};
use http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// The production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.sec4.dev/api/v1";

/// Every API key starts with this prefix.
pub const API_KEY_PREFIX: &str = "sec4_";

/// Default connect timeout of the built-in transport.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default total timeout of the built-in transport: connect plus 30s of reading.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(40);

const API_KEY_HEADER: &str = "x-api-key";
const JSON: &str = "application/json";
const CLIENT_IDENTIFIER: &str = concat!("sec4dev-rust/", env!("CARGO_PKG_VERSION"));

/// A client for the Sec4Dev security checks API.
///
/// The client is cheap to clone and safe to share between tasks. Clones share
/// the connection pool and the latest rate-limit snapshot.
///
/// # Examples
///
/// ```no_run
/// use sec4dev::Client;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), sec4dev::Error> {
/// let client = Client::builder()
///     .api_key("sec4_your_key")
///     .retries(5)
///     .retry_delay(Duration::from_millis(500))
///     .on_rate_limit(|info| println!("{} requests left", info.remaining))
///     .build()?;
///
/// if client.email().is_disposable("user@tempmail.com").await? {
///     println!("disposable address");
/// }
///
/// let ip = client.ip().check("203.0.113.42").await?;
/// println!("{} ({:.0}%)", ip.classification, ip.confidence * 100.0);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    retry_policy: RetryPolicy,
    rate_limit: RateLimitTracker,
}

impl Client {
    /// Creates a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the API key is blank or does not start
    /// with `sec4_`.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Email checks.
    pub fn email(&self) -> EmailService<'_> {
        EmailService::new(self)
    }

    /// IP checks.
    pub fn ip(&self) -> IpService<'_> {
        IpService::new(self)
    }

    /// The last rate-limit snapshot seen by any call on this client.
    ///
    /// With concurrent calls this may belong to a different call than the one
    /// that just finished; use [`Response::rate_limit`] for a per-call view.
    pub fn rate_limit(&self) -> RateLimitInfo {
        self.inner.rate_limit.latest()
    }

    /// The API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The retry policy fixed at construction.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry_policy
    }

    /// Makes a typed API request with retries.
    ///
    /// Attempts are bounded by the retry policy. Network errors, timeouts and
    /// 500/502/503/504 wait for an exponential backoff before the next attempt.
    /// A 429 waits for the server's `Retry-After` instead. Other error statuses
    /// return after a single attempt. Cancelling `ctx` stops the call at once.
    pub async fn call<Req, Res>(
        &self,
        ctx: &Context,
        metadata: RequestMetadata,
        body: Option<&Req>,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let policy = self.inner.retry_policy;
        let start_time = Instant::now();

        for attempt in 0..policy.max_attempts() {
            let outcome = ctx.run(self.execute(&metadata, body, attempt)).await?;

            let raw = match outcome {
                Ok(raw) => raw,
                Err(e) if e.is_retryable() && policy.has_attempts_left(attempt) => {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        path = %metadata.path,
                        "Request failed"
                    );
                    self.backoff(ctx, attempt).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let rate_limit = RateLimitInfo::from_headers(&raw.headers);
            self.inner.rate_limit.record(rate_limit);

            let status = raw.status.as_u16();
            tracing::info!(
                status = status,
                latency_ms = start_time.elapsed().as_millis(),
                attempt = attempt + 1,
                "Received HTTP response"
            );

            if status < 400 {
                return decode(raw, rate_limit, start_time.elapsed(), attempt + 1);
            }

            if status == 429 {
                let retry_after = retry::retry_after(&raw.headers);
                if policy.has_attempts_left(attempt) {
                    tracing::info!(
                        retry_after_secs = retry_after,
                        attempt = attempt + 1,
                        "Rate limited - waiting before retry"
                    );
                    ctx.sleep(Duration::from_secs(retry_after)).await?;
                    continue;
                }
                let (message, body) = parse_error_body(&raw.body);
                return Err(Error::from_status(
                    status,
                    message,
                    Some(body),
                    retry_after,
                    rate_limit.limit,
                    rate_limit.remaining,
                ));
            }

            let (message, body) = parse_error_body(&raw.body);
            let error = Error::from_status(
                status,
                message,
                Some(body),
                0,
                rate_limit.limit,
                rate_limit.remaining,
            );

            if !retry::is_retryable_status(status) {
                tracing::error!(status = status, error = %error, "Client error");
                return Err(error);
            }
            if !policy.has_attempts_left(attempt) {
                return Err(error);
            }

            tracing::warn!(
                error = %error,
                attempt = attempt + 1,
                path = %metadata.path,
                "Request failed"
            );
            self.backoff(ctx, attempt).await?;
        }

        Err(Error::Api(ApiError::new(
            "Request failed after retries",
            0,
            None,
        )))
    }

    /// Sends a JSON body with POST.
    pub async fn post<Req, Res>(
        &self,
        ctx: &Context,
        path: impl Into<String>,
        body: &Req,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.call(ctx, RequestMetadata::post(path), Some(body)).await
    }

    async fn backoff(&self, ctx: &Context, attempt: usize) -> Result<()> {
        let delay = self.inner.retry_policy.backoff_delay(attempt);
        tracing::info!(
            delay_ms = delay.as_millis(),
            attempt = attempt + 1,
            "Retrying request after delay"
        );
        ctx.sleep(delay).await
    }

    /// Executes a single request attempt and reads the whole body.
    async fn execute<Req>(
        &self,
        metadata: &RequestMetadata,
        body: Option<&Req>,
        attempt: usize,
    ) -> Result<RawResponse>
    where
        Req: Serialize + ?Sized,
    {
        let url = Url::parse(&format!("{}{}", self.inner.base_url, metadata.path))?;

        tracing::debug!(
            method = %metadata.method,
            url = %url,
            attempt = attempt + 1,
            "Executing HTTP request"
        );

        let mut request = self
            .inner
            .http_client
            .request(metadata.method.clone(), url)
            .header(API_KEY_HEADER, &self.inner.api_key)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .header(USER_AGENT, CLIENT_IDENTIFIER);

        if let Some(body) = body {
            let json =
                serde_json::to_vec(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;
            request = request.body(json);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
            headers,
        })
    }
}

/// Decodes a successful response.
fn decode<Res>(
    raw: RawResponse,
    rate_limit: RateLimitInfo,
    latency: Duration,
    attempts: usize,
) -> Result<Response<Res>>
where
    Res: DeserializeOwned,
{
    match serde_json::from_slice::<Res>(&raw.body) {
        Ok(data) => Ok(Response {
            data,
            raw_body: raw.text(),
            status: raw.status,
            headers: raw.headers,
            rate_limit,
            latency,
            attempts,
        }),
        Err(e) => {
            let raw_response = raw.text();
            tracing::error!(
                error = %e,
                raw_response = %raw_response,
                "Failed to deserialize response"
            );
            Err(Error::DeserializationFailed {
                raw_response,
                serde_error: e.to_string(),
                status: raw.status,
            })
        }
    }
}

/// Checks the API key once, at construction.
fn validate_api_key(api_key: &str) -> Result<String> {
    let key = api_key.trim();
    if key.is_empty() || !key.starts_with(API_KEY_PREFIX) {
        return Err(Error::validation(format!(
            "API key must start with {}",
            API_KEY_PREFIX
        )));
    }
    Ok(key.to_string())
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use sec4dev::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), sec4dev::Error> {
/// let client = ClientBuilder::new()
///     .api_key("sec4_your_key")
///     .base_url("https://staging.sec4.dev/api/v1/")?
///     .retries(2)
///     .timeout(Duration::from_secs(15))
///     .build()?;
///
/// assert_eq!(client.base_url(), "https://staging.sec4.dev/api/v1");
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    retry_policy: RetryPolicy,
    http_client: Option<reqwest::Client>,
    timeout: Duration,
    connect_timeout: Duration,
    on_rate_limit: Option<RateLimitCallback>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry_policy: RetryPolicy::default(),
            http_client: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            on_rate_limit: None,
        }
    }

    /// Sets the API key. It is validated by [`build`](Self::build).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the API root. Trailing slashes are stripped.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref().trim().trim_end_matches('/');
        Url::parse(url)?;
        self.base_url = url.to_string();
        Ok(self)
    }

    /// Sets how many times a failed request is retried. Defaults to 3.
    pub fn retries(mut self, retries: usize) -> Self {
        self.retry_policy.max_retries = retries;
        self
    }

    /// Sets the base delay of the exponential backoff. Defaults to 1s.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_policy.base_delay = delay;
        self
    }

    /// Sets the total timeout of the built-in transport. Defaults to 40s.
    ///
    /// Ignored when a custom client is supplied with [`http_client`](Self::http_client).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout of the built-in transport. Defaults to 10s.
    ///
    /// Ignored when a custom client is supplied with [`http_client`](Self::http_client).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Uses a preconfigured `reqwest::Client` as the transport.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Registers a callback run with every new rate-limit snapshot.
    ///
    /// It runs synchronously on the calling task, for successful and error
    /// responses alike, but not for transport failures.
    pub fn on_rate_limit<F>(mut self, callback: F) -> Self
    where
        F: Fn(RateLimitInfo) + Send + Sync + 'static,
    {
        self.on_rate_limit = Some(Arc::new(callback));
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a missing or malformed API key, checked
    /// before anything else, and [`Error::ConfigurationError`] if the transport
    /// cannot be built.
    pub fn build(self) -> Result<Client> {
        let api_key = validate_api_key(self.api_key.as_deref().unwrap_or_default())?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .connect_timeout(self.connect_timeout)
                .timeout(self.timeout)
                .build()
                .map_err(|e| {
                    Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
                })?,
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                api_key,
                base_url: self.base_url,
                retry_policy: self.retry_policy,
                rate_limit: RateLimitTracker::new(self.on_rate_limit),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
