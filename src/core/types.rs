//! Core types used throughout the clamgate library.
//!
//! This module defines the verdict produced for each scan request, its
//! classification, content fingerprints, and the pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a scanned file was classified.
///
/// On the wire this is the `infected` field: `no`, `yes` or `ignore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// The engine scanned the file and found nothing.
    #[serde(rename = "no")]
    Clean,

    /// The engine reported a threat, or its reply could not be read as clean.
    #[serde(rename = "yes")]
    Infected,

    /// The file matched the magic-number whitelist and was not sent to the engine.
    #[serde(rename = "ignore")]
    SkippedTrusted,
}

impl Classification {
    /// Returns `true` if the classification is `Clean`.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }

    /// Returns `true` if the classification is `Infected`.
    pub fn is_infected(&self) -> bool {
        matches!(self, Self::Infected)
    }

    /// Returns `true` if the engine was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::SkippedTrusted)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Infected => write!(f, "infected"),
            Self::SkippedTrusted => write!(f, "skipped_trusted"),
        }
    }
}

/// SHA-256 and size of a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Uppercase hex SHA-256, or empty if it could not be computed.
    pub sha256: String,

    /// Content size in bytes.
    pub size: u64,
}

/// Stages a scan request moves through, in order.
///
/// No stage is entered twice; `ShortCircuited` and `Delegated` are
/// mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStage {
    /// The request passed input validation.
    Received,
    /// Hash and size are known.
    Fingerprinted,
    /// The whitelist has been consulted.
    WhitelistChecked,
    /// A whitelist signature matched; the engine is skipped.
    ShortCircuited,
    /// The content is being streamed to the engine.
    Delegated,
    /// The engine reply has been classified.
    Classified,
    /// The verdict has been assembled.
    Completed,
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::Fingerprinted => "fingerprinted",
            Self::WhitelistChecked => "whitelist_checked",
            Self::ShortCircuited => "short_circuited",
            Self::Delegated => "delegated",
            Self::Classified => "classified",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// The result of one scan request.
///
/// Serializes to the wire shape consumed by the transport layer:
///
/// ```json
/// {"infected":"yes","blacklist":false,"unsafe":true,"rawReply":"stream: Eicar FOUND",
///  "signature":"Eicar","filename":"a.exe","sha256":"...","filesize":68,"duration":12}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanVerdict {
    /// Clean, infected, or skipped.
    #[serde(rename = "infected")]
    pub classification: Classification,

    /// Set only on the whitelist short-circuit path.
    #[serde(rename = "blacklist")]
    pub blacklisted: bool,

    /// Set whenever the engine did not vouch for the content.
    #[serde(rename = "unsafe")]
    pub is_unsafe: bool,

    /// Unmodified engine reply; empty when the engine was skipped.
    pub raw_reply: String,

    /// Signature name when infected; empty otherwise.
    #[serde(rename = "signature")]
    pub signature_name: String,

    /// Original filename of the upload.
    pub filename: String,

    /// Uppercase hex SHA-256 of the content, empty if hashing failed.
    #[serde(rename = "sha256")]
    pub content_hash: String,

    /// Content size in bytes.
    #[serde(rename = "filesize")]
    pub file_size: u64,

    /// Wall-clock time spent in the engine, in milliseconds.
    #[serde(rename = "duration")]
    pub duration_millis: u64,
}

impl ScanVerdict {
    /// Verdict for content the whitelist vouched for.
    pub fn skipped(filename: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            classification: Classification::SkippedTrusted,
            blacklisted: true,
            is_unsafe: true,
            raw_reply: String::new(),
            signature_name: String::new(),
            filename: filename.into(),
            content_hash: fingerprint.sha256,
            file_size: fingerprint.size,
            duration_millis: 0,
        }
    }

    /// Verdict for content the engine scanned.
    pub fn scanned(
        infected: bool,
        raw_reply: impl Into<String>,
        signature_name: impl Into<String>,
        filename: impl Into<String>,
        fingerprint: Fingerprint,
        duration_millis: u64,
    ) -> Self {
        let (classification, signature_name) = if infected {
            (Classification::Infected, signature_name.into())
        } else {
            (Classification::Clean, String::new())
        };

        Self {
            classification,
            blacklisted: false,
            is_unsafe: infected,
            raw_reply: raw_reply.into(),
            signature_name,
            filename: filename.into(),
            content_hash: fingerprint.sha256,
            file_size: fingerprint.size,
            duration_millis,
        }
    }

    /// Returns `true` if the engine found nothing.
    pub fn is_clean(&self) -> bool {
        self.classification.is_clean()
    }

    /// Returns `true` if the file is considered infected.
    pub fn is_infected(&self) -> bool {
        self.classification.is_infected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint() -> Fingerprint {
        Fingerprint {
            sha256: "ABC123".into(),
            size: 42,
        }
    }

    #[test]
    fn test_skipped_flags() {
        let verdict = ScanVerdict::skipped("photo.png", fingerprint());
        assert_eq!(verdict.classification, Classification::SkippedTrusted);
        assert!(verdict.blacklisted);
        assert!(verdict.is_unsafe);
        assert!(verdict.raw_reply.is_empty());
        assert_eq!(verdict.duration_millis, 0);
    }

    #[test]
    fn test_clean_drops_signature_name() {
        let verdict = ScanVerdict::scanned(false, "stream: OK", "ignored", "a.txt", fingerprint(), 5);
        assert!(verdict.is_clean());
        assert!(!verdict.is_unsafe);
        assert!(verdict.signature_name.is_empty());
    }

    #[test]
    fn test_wire_format() {
        let verdict = ScanVerdict::scanned(
            true,
            "stream: Eicar-Test-Signature FOUND",
            "Eicar-Test-Signature",
            "eicar.com",
            fingerprint(),
            12,
        );

        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["infected"], "yes");
        assert_eq!(json["blacklist"], false);
        assert_eq!(json["unsafe"], true);
        assert_eq!(json["rawReply"], "stream: Eicar-Test-Signature FOUND");
        assert_eq!(json["signature"], "Eicar-Test-Signature");
        assert_eq!(json["filename"], "eicar.com");
        assert_eq!(json["sha256"], "ABC123");
        assert_eq!(json["filesize"], 42);
        assert_eq!(json["duration"], 12);
    }

    #[test]
    fn test_classification_wire_names() {
        assert_eq!(serde_json::to_string(&Classification::Clean).unwrap(), "\"no\"");
        assert_eq!(serde_json::to_string(&Classification::Infected).unwrap(), "\"yes\"");
        assert_eq!(
            serde_json::to_string(&Classification::SkippedTrusted).unwrap(),
            "\"ignore\""
        );
    }
}
