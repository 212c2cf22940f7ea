//! Error types for the clamgate library.
//!
//! Every failure the pipeline can surface is a typed `ScanError`. Degraded
//! computations (hash failure, unreadable whitelist) are recovered where
//! they happen and never show up here.

use std::time::Duration;
use thiserror::Error;

/// Broad family of a [`ScanError`], used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller sent something unusable (empty file, missing name).
    CallerInput,
    /// The engine refused the stream because it is too large.
    EngineSizeLimit,
    /// Talking to the engine failed (refused, reset, timed out).
    EngineIo,
    /// The gateway itself is misconfigured.
    Configuration,
}

/// The main error type for scan operations.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The uploaded file has no content.
    #[error("empty file")]
    EmptyFile,

    /// A required request parameter is empty or missing.
    #[error("{name} parameter is empty or missing")]
    MissingParameter {
        /// Name of the missing parameter.
        name: String,
    },

    /// The engine rejected the stream for exceeding its size limit.
    #[error("engine '{engine}' rejected the stream: {reason}")]
    SizeLimitExceeded {
        /// Name of the engine.
        engine: String,
        /// What the engine (or the client-side ceiling) reported.
        reason: String,
    },

    /// Failed to connect to or exchange data with the engine.
    #[error("connection to engine '{engine}' failed: {message}")]
    ConnectionFailed {
        /// Name of the engine.
        engine: String,
        /// Error message describing the failure.
        message: String,
    },

    /// The engine did not answer within the configured timeout.
    #[error("engine '{engine}' timed out after {elapsed:?}")]
    Timeout {
        /// Name of the engine that timed out.
        engine: String,
        /// How long the operation ran before timing out.
        elapsed: Duration,
    },

    /// The engine answered, but not the way a healthy engine would.
    #[error("engine '{engine}' is unavailable: {reason}")]
    EngineUnavailable {
        /// Name of the engine that is unavailable.
        engine: String,
        /// Human-readable reason for unavailability.
        reason: String,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl ScanError {
    /// Returns the family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyFile | Self::MissingParameter { .. } => ErrorKind::CallerInput,
            Self::SizeLimitExceeded { .. } => ErrorKind::EngineSizeLimit,
            Self::ConnectionFailed { .. }
            | Self::Timeout { .. }
            | Self::EngineUnavailable { .. } => ErrorKind::EngineIo,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Returns `true` if the caller is at fault.
    pub fn is_caller_error(&self) -> bool {
        self.kind() == ErrorKind::CallerInput
    }

    /// Returns `true` if the engine refused the payload as too large.
    pub fn is_size_limit(&self) -> bool {
        self.kind() == ErrorKind::EngineSizeLimit
    }

    /// Returns the engine name if this error is associated with one.
    pub fn engine(&self) -> Option<&str> {
        match self {
            Self::SizeLimitExceeded { engine, .. }
            | Self::ConnectionFailed { engine, .. }
            | Self::Timeout { engine, .. }
            | Self::EngineUnavailable { engine, .. } => Some(engine),
            _ => None,
        }
    }

    /// Creates a `MissingParameter` error.
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Creates a `SizeLimitExceeded` error.
    pub fn size_limit(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SizeLimitExceeded {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `ConnectionFailed` error.
    pub fn connection_failed(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// Creates a `Timeout` error.
    pub fn timeout(engine: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            engine: engine.into(),
            elapsed,
        }
    }

    /// Creates an `EngineUnavailable` error.
    pub fn engine_unavailable(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EngineUnavailable {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// A specialized `Result` type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors() {
        assert!(ScanError::EmptyFile.is_caller_error());
        assert!(ScanError::missing_parameter("name").is_caller_error());
        assert!(!ScanError::size_limit("clamd", "too big").is_caller_error());
    }

    #[test]
    fn test_size_limit_is_distinct_from_io() {
        let size = ScanError::size_limit("clamd", "INSTREAM size limit exceeded");
        assert!(size.is_size_limit());
        assert_eq!(size.kind(), ErrorKind::EngineSizeLimit);

        let reset = ScanError::connection_failed("clamd", "connection reset by peer");
        assert!(!reset.is_size_limit());
        assert_eq!(reset.kind(), ErrorKind::EngineIo);

        let timeout = ScanError::timeout("clamd", Duration::from_millis(2000));
        assert_eq!(timeout.kind(), ErrorKind::EngineIo);
    }

    #[test]
    fn test_scan_error_engine() {
        let err = ScanError::engine_unavailable("clamd", "unexpected ping reply");
        assert_eq!(err.engine(), Some("clamd"));
        assert_eq!(err.kind(), ErrorKind::EngineIo);

        assert_eq!(ScanError::EmptyFile.engine(), None);
        assert_eq!(ScanError::configuration("bad port").engine(), None);
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::missing_parameter("name");
        assert_eq!(err.to_string(), "name parameter is empty or missing");
        assert_eq!(ScanError::EmptyFile.to_string(), "empty file");
    }
}
