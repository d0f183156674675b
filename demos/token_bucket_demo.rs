// demos/token_bucket_demo.rs

// Burst-then-wait walkthrough of the token bucket.
// Run with: cargo run --example token_bucket_demo

use flux_primitives::{TokenBucket, TokenBucketError};
use std::thread;
use std::time::Duration;

fn report(bucket: &TokenBucket, request: u32) -> Result<(), TokenBucketError> {
    let allowed = bucket.allow_request(1)?;
    println!(
        "Request {}: {} (Remaining: {:.2})",
        request,
        if allowed { "ALLOWED" } else { "DENIED" },
        bucket.current_tokens()?
    );
    Ok(())
}

fn main() -> Result<(), TokenBucketError> {
    // Capacity of 5 tokens, refill rate of 2 tokens per second
    let bucket = TokenBucket::new(5, 2.0)?;

    println!("Starting Token Bucket Demo...");
    println!("Capacity: 5 tokens, Refill Rate: 2.0 tokens/sec\n");

    println!("--- Simultaneous Burst of 6 requests ---");
    for request in 1..=6 {
        report(&bucket, request)?;
    }

    println!("\n--- Waiting for 2 seconds (refill) ---");
    thread::sleep(Duration::from_secs(2));

    println!("\n--- 4 more requests after wait ---");
    for request in 7..=10 {
        report(&bucket, request)?;
        thread::sleep(Duration::from_millis(400));
    }

    Ok(())
}
