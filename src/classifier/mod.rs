//! Classification of raw engine replies.
//!
//! clamd answers a stream scan with one line:
//!
//! ```text
//! stream: OK
//! stream: Eicar-Test-Signature FOUND
//! INSTREAM size limit exceeded. ERROR
//! ```
//!
//! A reply is clean only if it says `OK` and does not say `FOUND`.
//! Anything else, errors included, is treated as infected.

mod reply;

pub use reply::{classify, signature_name, ReplyVerdict};
