//! Checks whether an email address uses a disposable domain.
//!
//! Run with: `SEC4_API_KEY=sec4_... cargo run --example check_email -- user@tempmail.com`

use sec4dev::{Client, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("sec4dev=debug,check_email=info")
        .init();

    let api_key = std::env::var("SEC4_API_KEY").unwrap_or_default();
    let email = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "user@tempmail.com".to_string());

    let client = Client::builder()
        .api_key(api_key)
        .on_rate_limit(|info| {
            tracing::info!(
                remaining = info.remaining,
                limit = info.limit,
                "rate limit updated"
            )
        })
        .build()?;

    let result = client.email().check(&email).await?;

    println!("Email: {}", result.email);
    println!("Domain: {}", result.domain);
    println!("Disposable: {}", result.is_disposable);
    println!("Attempts: {}", result.attempts);
    println!(
        "Requests left: {}/{} (resets in {}s)",
        result.rate_limit.remaining, result.rate_limit.limit, result.rate_limit.reset_seconds
    );

    Ok(())
}
