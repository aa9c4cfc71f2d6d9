//! Shows how each kind of failure surfaces.
//!
//! Run with: `SEC4_API_KEY=sec4_... cargo run --example error_handling`

use sec4dev::{Client, Context, Error, ResponseBody};
use std::time::Duration;

fn report(label: &str, error: &Error) {
    match error {
        Error::Validation(e) if e.response_body.is_none() => {
            println!("{}: rejected locally: {}", label, e.message);
        }
        Error::RateLimited {
            retry_after,
            limit,
            remaining,
            ..
        } => {
            println!(
                "{}: rate limited, retry in {}s ({}/{} left)",
                label, retry_after, remaining, limit
            );
        }
        Error::Authentication(e) | Error::Forbidden(e) | Error::PaymentRequired(e) => {
            println!("{}: account problem ({}): {}", label, e.status_code, e.message);
        }
        Error::Cancelled | Error::DeadlineExceeded => {
            println!("{}: stopped by its context: {}", label, error);
        }
        other => {
            println!("{}: {}", label, other);
            if let Some(ResponseBody::Json(body)) = other.response_body() {
                println!("  body: {}", body);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("sec4dev=debug")
        .init();

    println!("=== Invalid API key ===");
    if let Err(e) = Client::new("not-a-key") {
        report("construction", &e);
    }

    let api_key = std::env::var("SEC4_API_KEY").unwrap_or_else(|_| "sec4_demo".to_string());
    let client = Client::builder().api_key(api_key).retries(1).build()?;

    println!("\n=== Invalid input ===");
    if let Err(e) = client.email().check("nobody@").await {
        report("email", &e);
    }
    if let Err(e) = client.ip().check("256.1.1.1").await {
        report("ip", &e);
    }

    println!("\n=== API errors ===");
    match client.email().check("user@example.com").await {
        Ok(result) => println!("disposable: {}", result.is_disposable),
        Err(e) => report("email", &e),
    }

    println!("\n=== Cancellation ===");
    let (ctx, cancel) = Context::background()
        .with_timeout(Duration::from_secs(2))
        .with_cancel();
    cancel.cancel();
    if let Err(e) = client.ip().check_with_context(&ctx, "8.8.8.8").await {
        report("ip", &e);
    }

    Ok(())
}
