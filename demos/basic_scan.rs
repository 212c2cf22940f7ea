//! Basic scan example demonstrating the three verdict paths.
//!
//! This example shows how to:
//! - Build a ScanOrchestrator around an engine
//! - Scan whitelisted, clean and infected content
//! - Print the verdict as the JSON a transport would return
//!
//! Run with: cargo run --example basic_scan
//!
//! Set `CLAMD_HOST` to scan against a real clamd instead of the mock.

use clamgate::backends::{ClamdClient, MockEngine};
use clamgate::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG=clamgate=debug shows every pipeline stage
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Clamgate Basic Scan Example ===\n");

    let counters = Arc::new(AtomicCounters::new());
    let builder = ScanOrchestrator::builder().with_counters(counters.clone());

    let orchestrator = if std::env::var("CLAMD_HOST").is_ok() {
        // Whitelist and clamd settings both come from the configuration
        let config = GatewayConfig::default().apply_env()?;
        println!(
            "Using clamd at {} with whitelist {}",
            config.clamd.address(),
            config.whitelist.path.display()
        );
        builder
            .with_config(&config)
            .engine(ClamdClient::new(config.clamd.clone())?)
            .build()?
    } else {
        println!("Using the mock engine with the built-in whitelist");
        builder
            .with_signatures(SignatureSet::builtin())
            .engine(MockEngine::infected("Eicar-Test-Signature").with_name("mock-clamd"))
            .build()?
    };

    println!("{}\n", orchestrator.ping().await?);

    // A PNG header is on the built-in whitelist and never reaches the engine
    let png = ScanRequest::new("avatar", vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
        .with_filename("avatar.png");
    let eicar = ScanRequest::new(
        "attachment",
        b"X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*".to_vec(),
    )
    .with_filename("eicar.com");

    for request in [&png, &eicar] {
        let verdict = orchestrator.scan(request).await?;
        println!("{} -> {}", request.filename(), verdict.classification);
        println!("{}\n", serde_json::to_string_pretty(&verdict)?);
    }

    // Empty uploads are rejected before any processing
    match orchestrator.scan(&ScanRequest::new("empty", Vec::new())).await {
        Err(e) if e.is_caller_error() => println!("Rejected: {}", e),
        other => println!("Unexpected: {:?}", other),
    }

    let snapshot = counters.snapshot();
    println!(
        "\ncalls={} blacklisted={} infected={}",
        snapshot.scan_call, snapshot.blacklisted, snapshot.infected
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
