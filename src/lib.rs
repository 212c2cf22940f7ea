//! # Clamgate
//!
//! A scanning gateway that sits in front of a ClamAV daemon and decides,
//! for each uploaded file, whether it is clean, infected, or trusted
//! without scanning.
//!
//! ## Overview
//!
//! Every request goes through the same pipeline:
//!
//! - The content is fingerprinted (uppercase SHA-256 and size)
//! - The first bytes are checked against a whitelist of magic numbers
//! - Whitelisted content is short-circuited with a `skipped_trusted` verdict
//! - Everything else is streamed to clamd and its reply is classified
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clamgate::prelude::*;
//! use clamgate::backends::ClamdClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::default().apply_env()?;
//!
//!     let orchestrator = ScanOrchestrator::builder()
//!         .with_config(&config)
//!         .engine(ClamdClient::new(config.clamd.clone())?)
//!         .build()?;
//!
//!     let request = ScanRequest::new("upload", b"file content".to_vec())
//!         .with_filename("report.docx");
//!     let verdict = orchestrator.scan(&request).await?;
//!
//!     println!("{}", serde_json::to_string(&verdict)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `default` - Includes the clamd client
//! - `clamav` - clamd TCP client
//!
//! ## Architecture
//!
//! - **Core**: Request, verdict and error types, fingerprinting, the engine contract
//! - **Magic**: Signature parsing and the lazily loaded whitelist
//! - **Classifier**: Interpretation of clamd replies
//! - **Backends**: Engine clients
//! - **Manager**: The scan orchestrator
//! - **Audit**: Structured audit events and counters
//! - **Config**: TOML and environment configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod backends;
pub mod classifier;
pub mod config;
pub mod core;
pub mod magic;
pub mod manager;

// Re-export commonly used types at the crate root
pub use crate::core::{
    Classification, EngineClient, Fingerprint, Fingerprinter, ScanError, ScanRequest, ScanResult,
    ScanVerdict,
};

pub use crate::config::{ClamdConfig, GatewayConfig};
pub use crate::magic::{MagicSignature, SignatureSet};
pub use crate::manager::{ScanOrchestrator, ScanOrchestratorBuilder};

/// Prelude module for convenient imports.
///
/// ```rust
/// use clamgate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::audit::{AtomicCounters, Counter, ScanCounters};
    pub use crate::config::{ClamdConfig, GatewayConfig};
    pub use crate::core::{
        Classification, EngineClient, Fingerprint, Fingerprinter, ScanError, ScanRequest,
        ScanResult, ScanVerdict,
    };
    pub use crate::magic::{LazyWhitelist, MagicSignature, SignatureSet};
    pub use crate::manager::{ScanOrchestrator, ScanOrchestratorBuilder};
}
