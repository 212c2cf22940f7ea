//! Engine client implementations.
//!
//! This module contains implementations of the `EngineClient` trait.
//!
//! ## Available Backends
//!
//! - [`mock`] - A mock engine for testing
//! - [`clamav`] - clamd over TCP (requires `clamav` feature)
//!
//! ## Implementing a Custom Backend
//!
//! To put a different engine behind the gateway, implement `EngineClient`:
//!
//! ```rust,ignore
//! use clamgate::core::{EngineClient, ScanError};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! pub struct MyEngine {
//!     // Your engine's configuration
//! }
//!
//! #[async_trait]
//! impl EngineClient for MyEngine {
//!     fn name(&self) -> &str {
//!         "my-engine"
//!     }
//!
//!     async fn ping(&self) -> Result<String, ScanError> {
//!         Ok("PONG".into())
//!     }
//!
//!     async fn scan(&self, data: &[u8]) -> Result<Vec<u8>, ScanError> {
//!         // Reply in clamd's format: "stream: OK" or "stream: <name> FOUND"
//!         todo!()
//!     }
//! }
//! ```

pub mod mock;

#[cfg(feature = "clamav")]
pub mod clamav;

// Re-exports
pub use mock::{MockBehavior, MockEngine};

#[cfg(feature = "clamav")]
pub use clamav::ClamdClient;
