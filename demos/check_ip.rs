//! Classifies an IP address, bounded by a deadline.
//!
//! Run with: `SEC4_API_KEY=sec4_... cargo run --example check_ip -- 203.0.113.42`

use sec4dev::{Client, Context, Error};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("sec4dev=debug,check_ip=info")
        .init();

    let api_key = std::env::var("SEC4_API_KEY").unwrap_or_default();
    let ip = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "203.0.113.42".to_string());

    let client = Client::builder()
        .api_key(api_key)
        .retries(2)
        .retry_delay(Duration::from_millis(500))
        .build()?;

    // Give up on the whole call, retries included, after 20 seconds
    let ctx = Context::background().with_timeout(Duration::from_secs(20));
    let result = client.ip().check_with_context(&ctx, &ip).await?;

    println!("IP: {}", result.ip);
    println!(
        "Classification: {} ({:.0}% confidence)",
        result.classification,
        result.confidence * 100.0
    );

    let signals = &result.signals;
    println!("Hosting: {}", signals.is_hosting);
    println!("Residential: {}", signals.is_residential);
    println!("Mobile: {}", signals.is_mobile);
    println!("VPN: {}", signals.is_vpn);
    println!("Tor: {}", signals.is_tor);
    println!("Proxy: {}", signals.is_proxy);

    match result.network.asn {
        Some(asn) => println!("ASN: AS{}", asn),
        None => println!("ASN: unknown"),
    }
    if let Some(org) = &result.network.org {
        println!("Org: {}", org);
    }
    if let Some(country) = &result.geo.country {
        println!("Country: {}", country);
    }

    Ok(())
}
