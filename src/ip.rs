//! IP reputation classification.

use crate::{validation::validate_ip, Client, Context, Response, Result};
use serde::{Deserialize, Deserializer, Serialize};

const CHECK_PATH: &str = "/ip/check";

/// Boolean signals behind an IP classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpSignals {
    /// Belongs to a hosting or cloud provider.
    pub is_hosting: bool,
    /// Belongs to a residential ISP.
    pub is_residential: bool,
    /// Belongs to a mobile carrier.
    pub is_mobile: bool,
    /// Known VPN endpoint.
    pub is_vpn: bool,
    /// Known Tor exit node.
    pub is_tor: bool,
    /// Known open or commercial proxy.
    pub is_proxy: bool,
}

/// Network ownership of an IP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpNetwork {
    /// Autonomous system number; `None` when the API reports `null`.
    pub asn: Option<u32>,
    /// Organization the address is registered to.
    pub org: Option<String>,
    /// Short provider name, e.g. `AWS`.
    pub provider: Option<String>,
}

/// Location of an IP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpGeo {
    /// ISO country code.
    pub country: Option<String>,
    /// Region within the country.
    pub region: Option<String>,
}

/// Result of an IP check.
///
/// Keys missing from the response, or sent as `null` for the nested
/// objects, decode to their empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpCheckResult {
    /// The address that was checked.
    pub ip: String,
    /// Overall class, e.g. `hosting` or `residential`.
    pub classification: String,
    /// Confidence in the classification, from 0 to 1.
    pub confidence: f64,
    /// Individual signals.
    #[serde(deserialize_with = "null_as_default")]
    pub signals: IpSignals,
    /// Network ownership.
    #[serde(deserialize_with = "null_as_default")]
    pub network: IpNetwork,
    /// Location.
    #[serde(deserialize_with = "null_as_default")]
    pub geo: IpGeo,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    ip: &'a str,
}

/// IP operations, obtained from [`Client::ip`].
///
/// The `is_*` helpers each run a full, uncached check and project one signal.
#[derive(Clone, Copy)]
pub struct IpService<'a> {
    client: &'a Client,
}

impl<'a> IpService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Classifies an IPv4 or IPv6 address.
    ///
    /// The address is validated locally first; a malformed one returns
    /// [`Error::Validation`](crate::Error::Validation) without a request.
    pub async fn check(&self, ip: &str) -> Result<Response<IpCheckResult>> {
        self.check_with_context(&Context::background(), ip).await
    }

    /// Like [`check`](Self::check), bounded by `ctx`.
    pub async fn check_with_context(
        &self,
        ctx: &Context,
        ip: &str,
    ) -> Result<Response<IpCheckResult>> {
        validate_ip(ip)?;
        let request = CheckRequest { ip: ip.trim() };
        self.client.post(ctx, CHECK_PATH, &request).await
    }

    async fn signals(&self, ip: &str) -> Result<IpSignals> {
        Ok(self.check(ip).await?.signals)
    }

    /// Returns `true` if the IP is hosting or cloud.
    pub async fn is_hosting(&self, ip: &str) -> Result<bool> {
        Ok(self.signals(ip).await?.is_hosting)
    }

    /// Returns `true` if the IP is a VPN endpoint.
    pub async fn is_vpn(&self, ip: &str) -> Result<bool> {
        Ok(self.signals(ip).await?.is_vpn)
    }

    /// Returns `true` if the IP is a Tor exit node.
    pub async fn is_tor(&self, ip: &str) -> Result<bool> {
        Ok(self.signals(ip).await?.is_tor)
    }

    /// Returns `true` if the IP is residential.
    pub async fn is_residential(&self, ip: &str) -> Result<bool> {
        Ok(self.signals(ip).await?.is_residential)
    }

    /// Returns `true` if the IP is on a mobile carrier.
    pub async fn is_mobile(&self, ip: &str) -> Result<bool> {
        Ok(self.signals(ip).await?.is_mobile)
    }

    /// Returns `true` if the IP is a proxy.
    pub async fn is_proxy(&self, ip: &str) -> Result<bool> {
        Ok(self.signals(ip).await?.is_proxy)
    }
}
