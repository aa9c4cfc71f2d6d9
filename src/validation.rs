//! Input checks run before any request is sent.

use crate::{Error, Result};
use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Rejects an email that is empty, blank, or not shaped like `local@domain.tld`.
///
/// # Examples
///
/// ```
/// use sec4dev::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("nobody@").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(Error::validation("Email is required"));
    }
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::validation("Email cannot be empty"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(Error::validation("Invalid email format"));
    }
    Ok(())
}

/// Rejects anything that is not an IPv4 or IPv6 literal.
///
/// # Examples
///
/// ```
/// use sec4dev::validation::validate_ip;
///
/// assert!(validate_ip("2001:db8::1").is_ok());
/// assert!(validate_ip("256.1.1.1").is_err());
/// ```
pub fn validate_ip(ip: &str) -> Result<()> {
    if ip.is_empty() {
        return Err(Error::validation("IP address is required"));
    }
    let ip = ip.trim();
    if ip.is_empty() {
        return Err(Error::validation("IP address cannot be empty"));
    }
    if ip.parse::<IpAddr>().is_err() {
        return Err(Error::validation("Invalid IP address format"));
    }
    Ok(())
}
