//! Mock engine for testing.
//!
//! `MockEngine` answers scans with a canned reply (or a canned failure)
//! and counts how often it was called, so tests can assert that the
//! engine was or was not consulted.

use crate::core::{EngineClient, ScanError};

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// What a [`MockEngine`] does when asked to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Answer with these reply bytes.
    Reply(Vec<u8>),
    /// Fail as if the engine refused an oversized stream.
    SizeLimit,
    /// Fail as if the connection was refused.
    ConnectionRefused,
    /// Fail as if the engine never answered.
    Timeout,
}

/// A mock engine for testing purposes.
///
/// # Examples
///
/// ```rust
/// use clamgate::backends::MockEngine;
///
/// let clean = MockEngine::clean();
/// let infected = MockEngine::infected("Win.Test.EICAR_HDB-1");
/// assert_eq!(clean.scan_count(), 0);
/// ```
#[derive(Debug)]
pub struct MockEngine {
    name: String,
    behavior: MockBehavior,
    latency: Option<Duration>,
    scan_count: AtomicU64,
    ping_count: AtomicU64,
    unhealthy: AtomicBool,
}

impl MockEngine {
    /// Creates a mock engine with the given behavior.
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            name: "mock".to_string(),
            behavior,
            latency: None,
            scan_count: AtomicU64::new(0),
            ping_count: AtomicU64::new(0),
            unhealthy: AtomicBool::new(false),
        }
    }

    /// Creates a mock engine that answers every scan with `reply`.
    pub fn with_reply(reply: impl Into<Vec<u8>>) -> Self {
        Self::new(MockBehavior::Reply(reply.into()))
    }

    /// Creates a mock engine that reports every stream clean.
    pub fn clean() -> Self {
        Self::with_reply("stream: OK")
    }

    /// Creates a mock engine that reports `signature` for every stream.
    pub fn infected(signature: &str) -> Self {
        Self::with_reply(format!("stream: {} FOUND", signature))
    }

    /// Creates a mock engine whose scans fail with `behavior`.
    pub fn failing(behavior: MockBehavior) -> Self {
        Self::new(behavior)
    }

    /// Sets the name of this engine.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the simulated latency for scans.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the number of scans requested.
    pub fn scan_count(&self) -> u64 {
        self.scan_count.load(Ordering::SeqCst)
    }

    /// Returns the number of pings received.
    pub fn ping_count(&self) -> u64 {
        self.ping_count.load(Ordering::SeqCst)
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }
}

#[async_trait]
impl EngineClient for MockEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ping(&self) -> Result<String, ScanError> {
        self.ping_count.fetch_add(1, Ordering::SeqCst);

        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(ScanError::connection_failed(
                &self.name,
                "mock engine is unhealthy",
            ));
        }
        Ok("PONG".to_string())
    }

    async fn scan(&self, _data: &[u8]) -> Result<Vec<u8>, ScanError> {
        self.scan_count.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match &self.behavior {
            MockBehavior::Reply(reply) => Ok(reply.clone()),
            MockBehavior::SizeLimit => Err(ScanError::size_limit(
                &self.name,
                "INSTREAM size limit exceeded",
            )),
            MockBehavior::ConnectionRefused => Err(ScanError::connection_failed(
                &self.name,
                "connection refused",
            )),
            MockBehavior::Timeout => Err(ScanError::timeout(
                &self.name,
                self.latency.unwrap_or(Duration::from_millis(2000)),
            )),
        }
    }
}
