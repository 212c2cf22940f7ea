//! Custom engine example demonstrating how to put a new engine behind the gateway.
//!
//! This example shows how to:
//! - Implement the EngineClient trait for a custom engine
//! - Answer in clamd's reply format so the classifier understands it
//! - Integrate with the ScanOrchestrator
//!
//! Run with: cargo run --example custom_engine

use async_trait::async_trait;
use clamgate::prelude::*;
use std::collections::HashMap;

/// An engine that flags content by its SHA-256 fingerprint.
#[derive(Debug)]
struct HashBlocklistEngine {
    name: String,
    blocklist: HashMap<String, String>,
    fingerprinter: Fingerprinter,
}

impl HashBlocklistEngine {
    /// Creates a new engine with an empty blocklist.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocklist: HashMap::new(),
            fingerprinter: Fingerprinter::new(),
        }
    }

    /// Blocks content with the given hash, reported under `signature`.
    pub fn with_blocked_hash(mut self, hash: impl Into<String>, signature: impl Into<String>) -> Self {
        self.blocklist.insert(hash.into(), signature.into());
        self
    }
}

#[async_trait]
impl EngineClient for HashBlocklistEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ping(&self) -> Result<String, ScanError> {
        // Nothing to connect to; always healthy
        Ok("PONG".to_string())
    }

    async fn scan(&self, data: &[u8]) -> Result<Vec<u8>, ScanError> {
        let fingerprint = self.fingerprinter.fingerprint(data);

        tracing::debug!(
            engine = self.name(),
            sha256 = %fingerprint.sha256,
            "Checking hash against blocklist"
        );

        let reply = match self.blocklist.get(&fingerprint.sha256) {
            Some(signature) => format!("stream: {} FOUND", signature),
            None => "stream: OK".to_string(),
        };
        Ok(reply.into_bytes())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Custom Engine Example ===\n");

    let malicious_content = b"This content is known to be malicious!";
    let malicious_hash = Fingerprinter::new().fingerprint(malicious_content).sha256;
    println!("Malicious file hash: {}", malicious_hash);

    let engine = HashBlocklistEngine::new("hash-blocklist")
        .with_blocked_hash(&malicious_hash, "Blocklist.Match");

    // No whitelist: every file goes to the engine
    let orchestrator = ScanOrchestrator::builder()
        .engine(engine)
        .with_signatures(SignatureSet::empty())
        .build()?;

    println!("\n=== Test 1: Scanning a clean file ===");
    let clean = ScanRequest::new("upload", b"This is a perfectly safe file.".to_vec())
        .with_filename("safe.txt");
    let verdict = orchestrator.scan(&clean).await?;
    println!("Result: {}", verdict.classification);

    println!("\n=== Test 2: Scanning the malicious file ===");
    let malicious = ScanRequest::new("upload", malicious_content.to_vec())
        .with_filename("malware.bin");
    let verdict = orchestrator.scan(&malicious).await?;
    println!("Result: {}", verdict.classification);
    println!("Signature: {}", verdict.signature_name);
    println!("Raw reply: {}", verdict.raw_reply);

    println!("\n=== Example Complete ===");
    Ok(())
}
