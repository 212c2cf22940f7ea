//! Scan orchestration.
//!
//! The `ScanOrchestrator` takes one request at a time through the
//! pipeline: fingerprint, whitelist check, then either a short-circuit
//! verdict or delegation to the engine and classification of its reply.

mod orchestrator;

pub use orchestrator::{ScanOrchestrator, ScanOrchestratorBuilder};
