//! A single magic-number signature.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// `offset,hex-bytes`, e.g. `0,89 50 4E 47 0D 0A 1A 0A`.
static SIGNATURE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)\s*,\s*((?:[A-Fa-f0-9]{2}\s?)+)$").expect("signature line regex")
});

/// A fixed byte sequence expected at a fixed offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MagicSignature {
    offset: usize,
    pattern: Vec<u8>,
}

impl MagicSignature {
    /// Creates a signature, rejecting an empty pattern.
    pub fn new(offset: usize, pattern: impl Into<Vec<u8>>) -> Option<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return None;
        }
        Some(Self { offset, pattern })
    }

    /// Parses one whitelist line.
    ///
    /// Returns `None` for comments and for anything that is not a
    /// well-formed `offset,hex-bytes` record.
    pub fn parse(line: &str) -> Option<Self> {
        let captures = SIGNATURE_LINE.captures(line)?;
        let offset = captures[1].parse::<usize>().ok()?;
        let pattern = decode_hex(&captures[2])?;
        Self::new(offset, pattern)
    }

    /// Byte offset at which the pattern must appear.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The bytes that must appear at the offset.
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Returns `true` if `data` holds the pattern at the offset.
    ///
    /// Buffers too short to hold the whole pattern never match.
    pub fn matches(&self, data: &[u8]) -> bool {
        let Some(end) = self.offset.checked_add(self.pattern.len()) else {
            return false;
        };
        data.get(self.offset..end)
            .map_or(false, |window| window == self.pattern.as_slice())
    }

    /// Pattern as uppercase hex without separators.
    pub fn pattern_hex(&self) -> String {
        self.pattern.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

impl fmt::Display for MagicSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},", self.offset)?;
        for (i, byte) in self.pattern.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_compact() {
        let sig = MagicSignature::parse("0, CAFEBABE00").unwrap();
        assert_eq!(sig.offset(), 0);
        assert_eq!(sig.pattern(), &[0xCA, 0xFE, 0xBA, 0xBE, 0x00]);
    }

    #[test]
    fn test_parse_spaced() {
        let sig = MagicSignature::parse("5, CA FE BA BE 00").unwrap();
        assert_eq!(sig.offset(), 5);
        assert_eq!(sig.pattern(), &[0xCA, 0xFE, 0xBA, 0xBE, 0x00]);
    }

    #[test]
    fn test_parse_lowercase_and_tight_comma() {
        let sig = MagicSignature::parse("0,89 50 4e 47 0d 0a 1a 0a").unwrap();
        assert_eq!(sig.pattern_hex(), "89504E470D0A1A0A");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for line in [
            "#0, CAFEBABE00",
            "# PNG",
            "",
            "0,",
            "0, CAFEBABE0",
            "0, CA FE B",
            "0, ZZ",
            "0, CA:FE",
            "-1, CA",
            "x, CA",
            "0 CA FE",
            "0, CA  FE",
            "99999999999999999999999, CA",
        ] {
            assert!(MagicSignature::parse(line).is_none(), "accepted {:?}", line);
        }
    }

    #[test]
    fn test_new_rejects_empty_pattern() {
        assert!(MagicSignature::new(0, Vec::new()).is_none());
    }

    #[test]
    fn test_matches_at_offset() {
        let sig = MagicSignature::new(2, vec![0xAA, 0xBB]).unwrap();
        assert!(sig.matches(&[0x00, 0x00, 0xAA, 0xBB]));
        assert!(sig.matches(&[0x00, 0x00, 0xAA, 0xBB, 0xCC]));
        assert!(!sig.matches(&[0xAA, 0xBB, 0x00, 0x00]));
        assert!(!sig.matches(&[0x00, 0x00, 0xAA]));
        assert!(!sig.matches(&[]));
    }

    #[test]
    fn test_matches_huge_offset() {
        let sig = MagicSignature::new(usize::MAX, vec![0x00]).unwrap();
        assert!(!sig.matches(&[0x00; 16]));
    }

    #[test]
    fn test_display() {
        let sig = MagicSignature::parse("0,ffd8ff").unwrap();
        assert_eq!(sig.to_string(), "0,FF D8 FF");
    }

    proptest! {
        #[test]
        fn prop_hex_round_trip(
            offset in 0usize..100_000,
            pattern in proptest::collection::vec(any::<u8>(), 1..32),
            spaced in any::<bool>(),
            lower in any::<bool>(),
        ) {
            let hex: Vec<String> = pattern
                .iter()
                .map(|b| if lower { format!("{:02x}", b) } else { format!("{:02X}", b) })
                .collect();
            let sep = if spaced { " " } else { "" };
            let line = format!("{}, {}", offset, hex.join(sep));

            let sig = MagicSignature::parse(&line).unwrap();
            prop_assert_eq!(sig.offset(), offset);
            prop_assert_eq!(sig.pattern_hex(), hex.concat().to_uppercase());
        }

        #[test]
        fn prop_short_buffers_never_match(
            offset in 0usize..64,
            pattern in proptest::collection::vec(any::<u8>(), 1..16),
            data in proptest::collection::vec(any::<u8>(), 0..80),
        ) {
            let sig = MagicSignature::new(offset, pattern.clone()).unwrap();
            if data.len() < offset + pattern.len() {
                prop_assert!(!sig.matches(&data));
            }
        }
    }
}
