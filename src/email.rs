//! Disposable-email detection.

use crate::{validation::validate_email, Client, Context, Response, Result};
use serde::{Deserialize, Serialize};

const CHECK_PATH: &str = "/email/check";

/// Result of an email check.
///
/// Keys missing from the response decode to their empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailCheckResult {
    /// The address that was checked.
    pub email: String,
    /// Its domain.
    pub domain: String,
    /// Whether the domain hands out throwaway inboxes.
    pub is_disposable: bool,
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    email: &'a str,
}

/// Email operations, obtained from [`Client::email`].
#[derive(Clone, Copy)]
pub struct EmailService<'a> {
    client: &'a Client,
}

impl<'a> EmailService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Checks whether an email uses a disposable domain.
    ///
    /// The address is validated locally first; a malformed one returns
    /// [`Error::Validation`](crate::Error::Validation) without a request.
    pub async fn check(&self, email: &str) -> Result<Response<EmailCheckResult>> {
        self.check_with_context(&Context::background(), email).await
    }

    /// Like [`check`](Self::check), bounded by `ctx`.
    pub async fn check_with_context(
        &self,
        ctx: &Context,
        email: &str,
    ) -> Result<Response<EmailCheckResult>> {
        validate_email(email)?;
        let request = CheckRequest {
            email: email.trim(),
        };
        self.client.post(ctx, CHECK_PATH, &request).await
    }

    /// Returns `true` if the email's domain is disposable.
    ///
    /// Runs a full check on every call.
    pub async fn is_disposable(&self, email: &str) -> Result<bool> {
        Ok(self.check(email).await?.is_disposable)
    }
}
