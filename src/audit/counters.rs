//! Request counters handed to an external telemetry collaborator.
//!
//! Incrementing is fire-and-forget: implementations must not block and
//! must not fail the pipeline.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// The counters the pipeline increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// One per request received.
    ScanCall,
    /// One per whitelist short-circuit.
    Blacklisted,
    /// One per infected verdict.
    Infected,
}

impl Counter {
    /// Metric name of this counter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScanCall => "clamgate.scan.call",
            Self::Blacklisted => "clamgate.scan.blacklisted",
            Self::Infected => "clamgate.scan.infected",
        }
    }
}

/// Sink for pipeline counters.
pub trait ScanCounters: Send + Sync + Debug {
    /// Adds one to `counter`.
    fn increment(&self, counter: Counter);
}

/// Discards every increment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCounters;

impl ScanCounters for NoopCounters {
    fn increment(&self, _counter: Counter) {}
}

/// In-memory counters.
#[derive(Debug, Default)]
pub struct AtomicCounters {
    scan_call: AtomicU64,
    blacklisted: AtomicU64,
    infected: AtomicU64,
}

/// Point-in-time copy of [`AtomicCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Requests received.
    pub scan_call: u64,
    /// Whitelist short-circuits.
    pub blacklisted: u64,
    /// Infected verdicts.
    pub infected: u64,
}

impl AtomicCounters {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value of `counter`.
    pub fn get(&self, counter: Counter) -> u64 {
        self.slot(counter).load(Ordering::Relaxed)
    }

    /// Returns all values at once.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            scan_call: self.get(Counter::ScanCall),
            blacklisted: self.get(Counter::Blacklisted),
            infected: self.get(Counter::Infected),
        }
    }

    fn slot(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::ScanCall => &self.scan_call,
            Counter::Blacklisted => &self.blacklisted,
            Counter::Infected => &self.infected,
        }
    }
}

impl ScanCounters for AtomicCounters {
    fn increment(&self, counter: Counter) {
        self.slot(counter).fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = counter.name(), "Counter incremented");
    }
}
