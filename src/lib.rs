//! # sec4dev - Sec4Dev security checks API client
//!
//! An async client for the Sec4Dev API: disposable-email detection and IP
//! reputation classification. Requests are retried with exponential backoff,
//! 429 responses honor `Retry-After`, rate-limit headers are tracked, and
//! failures map to a typed [`Error`] per HTTP status.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sec4dev::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sec4dev::Error> {
//!     let client = Client::new("sec4_your_key")?;
//!
//!     let email = client.email().check("user@tempmail.com").await?;
//!     println!("{} disposable: {}", email.domain, email.is_disposable);
//!
//!     let ip = client.ip().check("203.0.113.42").await?;
//!     println!("{} is {}", ip.ip, ip.classification);
//!     if let Some(asn) = ip.network.asn {
//!         println!("AS{}", asn);
//!     }
//!
//!     println!("{} requests left", client.rate_limit().remaining);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use sec4dev::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::new("sec4_your_key")?;
//! match client.ip().is_vpn("203.0.113.42").await {
//!     Ok(vpn) => println!("VPN: {}", vpn),
//!     Err(Error::PaymentRequired(e)) => eprintln!("quota exhausted: {}", e.message),
//!     Err(Error::RateLimited { retry_after, .. }) => eprintln!("retry in {}s", retry_after),
//!     Err(Error::Validation(e)) => eprintln!("bad input: {}", e.message),
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellation
//!
//! Every check has a `check_with_context` variant taking a [`Context`]. A
//! cancelled or expired context interrupts the HTTP exchange or the sleep
//! between retries and returns [`Error::Cancelled`] or
//! [`Error::DeadlineExceeded`] without further attempts.
//!
//! ## Logging
//!
//! Attempts, retries and failures are reported as `tracing` events under the
//! `sec4dev` target. Nothing is printed unless the application installs a
//! subscriber.

mod client;
pub mod context;
pub mod email;
mod error;
pub mod ip;
pub mod metadata;
pub mod rate_limit;
mod response;
pub mod retry;
pub mod validation;

pub use client::{
    Client, ClientBuilder, API_KEY_PREFIX, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_TIMEOUT,
};
pub use context::{CancelHandle, Context};
pub use email::{EmailCheckResult, EmailService};
pub use error::{ApiError, Error, ResponseBody, Result, UNKNOWN_ERROR_MESSAGE};
pub use ip::{IpCheckResult, IpGeo, IpNetwork, IpService, IpSignals};
pub use rate_limit::{RateLimitCallback, RateLimitInfo};
pub use response::Response;
pub use retry::RetryPolicy;
