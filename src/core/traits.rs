//! Core traits for the clamgate library.
//!
//! This module defines the `EngineClient` trait, the narrow contract the
//! pipeline needs from an antivirus engine.

use crate::core::error::ScanError;

use async_trait::async_trait;
use std::fmt::Debug;

/// An antivirus engine the pipeline can delegate content to.
///
/// # Implementation Notes
///
/// - Implementations must be `Send + Sync`; one client is shared by all requests.
/// - Each call should use its own connection and release it on every exit path.
/// - Timeouts belong to the implementation and must surface as `ScanError::Timeout`.
/// - Oversized streams must surface as `ScanError::SizeLimitExceeded`, never as
///   a generic I/O error.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use clamgate::core::{EngineClient, ScanError};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct AlwaysClean;
///
/// #[async_trait]
/// impl EngineClient for AlwaysClean {
///     fn name(&self) -> &str {
///         "always-clean"
///     }
///
///     async fn ping(&self) -> Result<String, ScanError> {
///         Ok("PONG".into())
///     }
///
///     async fn scan(&self, _data: &[u8]) -> Result<Vec<u8>, ScanError> {
///         Ok(b"stream: OK".to_vec())
///     }
/// }
/// ```
#[async_trait]
pub trait EngineClient: Send + Sync + Debug {
    /// Returns a stable identifier like "clamd".
    fn name(&self) -> &str;

    /// Probes the engine and returns its free-text status.
    async fn ping(&self) -> Result<String, ScanError>;

    /// Streams the whole content to the engine and returns its raw reply.
    ///
    /// # Errors
    ///
    /// - `SizeLimitExceeded` - The engine refused the stream as too large.
    /// - `ConnectionFailed` / `Timeout` - Talking to the engine failed.
    async fn scan(&self, data: &[u8]) -> Result<Vec<u8>, ScanError>;
}

/// An arc-wrapped engine for shared ownership.
pub type ArcEngine = std::sync::Arc<dyn EngineClient>;
