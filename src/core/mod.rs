//! Core types and traits for the clamgate library.
//!
//! This module provides the fundamental building blocks used throughout
//! the library:
//!
//! - [`types`] - `ScanVerdict`, `Classification`, `Fingerprint`, `ScanStage`
//! - [`traits`] - The `EngineClient` trait
//! - [`error`] - Structured error types
//! - [`input`] - The `ScanRequest` input
//! - [`hasher`] - SHA-256 content fingerprinting

pub mod error;
pub mod hasher;
pub mod input;
pub mod traits;
pub mod types;

pub use error::{ErrorKind, ScanError, ScanResult};
pub use hasher::Fingerprinter;
pub use input::ScanRequest;
pub use traits::{ArcEngine, EngineClient};
pub use types::{Classification, Fingerprint, ScanStage, ScanVerdict};
