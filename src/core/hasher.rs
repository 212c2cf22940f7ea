//! Content fingerprinting with SHA-256.
//!
//! A fingerprint is the uppercase hex SHA-256 of the content plus its size.
//! The content is already buffered in memory, so hashing cannot fail.

use crate::core::types::Fingerprint;

use sha2::{Digest, Sha256};

/// Computes content fingerprints.
///
/// # Examples
///
/// ```rust
/// use clamgate::core::Fingerprinter;
///
/// let fp = Fingerprinter::new().fingerprint(b"hello world");
/// assert_eq!(fp.size, 11);
/// assert_eq!(fp.sha256.len(), 64);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Fingerprinter;

impl Fingerprinter {
    /// Creates a new `Fingerprinter`.
    pub fn new() -> Self {
        Self
    }

    /// Fingerprints bytes that are already in memory.
    pub fn fingerprint(&self, data: &[u8]) -> Fingerprint {
        Fingerprint {
            sha256: to_upper_hex(Sha256::digest(data).as_slice()),
            size: data.len() as u64,
        }
    }
}

fn to_upper_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02X}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let fp = Fingerprinter::new().fingerprint(b"abc");
        assert_eq!(
            fp.sha256,
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
        assert_eq!(fp.size, 3);
    }

    #[test]
    fn test_uppercase_no_separators() {
        let fp = Fingerprinter::new().fingerprint(b"hello world");
        assert_eq!(fp.sha256.len(), 64);
        assert!(fp
            .sha256
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn test_empty_content_has_a_hash() {
        let fp = Fingerprinter::new().fingerprint(b"");
        assert_eq!(
            fp.sha256,
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
        assert_eq!(fp.size, 0);
    }

    #[test]
    fn test_hash_deterministic() {
        let hasher = Fingerprinter::new();
        assert_eq!(hasher.fingerprint(b"data"), hasher.fingerprint(b"data"));
        assert_ne!(
            hasher.fingerprint(b"data1").sha256,
            hasher.fingerprint(b"data2").sha256
        );
    }
}
