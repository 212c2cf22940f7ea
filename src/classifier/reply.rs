use once_cell::sync::Lazy;
use regex::Regex;

/// `<stream-id>: <signature-name> FOUND`
static FOUND_REPLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.* (.*) FOUND.*$").expect("found reply regex"));

/// What an engine reply says about the scanned content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyVerdict {
    /// `false` only for an unambiguous clean reply.
    pub infected: bool,

    /// Signature name when infected and the reply names one; empty otherwise.
    pub signature_name: String,
}

/// Classifies a raw engine reply, failing closed.
///
/// # Examples
///
/// ```rust
/// use clamgate::classifier::classify;
///
/// assert!(!classify("stream: OK").infected);
///
/// let verdict = classify("stream: Eicar-Test-Signature FOUND");
/// assert!(verdict.infected);
/// assert_eq!(verdict.signature_name, "Eicar-Test-Signature");
///
/// assert!(classify("stream: ERROR").infected);
/// ```
pub fn classify(raw_reply: &str) -> ReplyVerdict {
    if raw_reply.contains("OK") && !raw_reply.contains("FOUND") {
        return ReplyVerdict {
            infected: false,
            signature_name: String::new(),
        };
    }

    ReplyVerdict {
        infected: true,
        signature_name: signature_name(raw_reply),
    }
}

/// Extracts the signature name from a `... <name> FOUND` reply.
///
/// Returns an empty string when the reply does not have that shape.
pub fn signature_name(raw_reply: &str) -> String {
    let reply = raw_reply.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());
    FOUND_REPLY
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
