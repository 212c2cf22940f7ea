//! Magic-number whitelist.
//!
//! Files whose header matches a trusted file-type signature skip the
//! antivirus engine. Signatures come from a text file, one per line:
//!
//! ```text
//! # Line format is "offset, XX XX XX" where XX is the hex value of a byte
//! # PNG
//! 0,89 50 4E 47 0D 0A 1A 0A
//! ```
//!
//! Lines that do not follow this format are ignored. If the file cannot be
//! read, a built-in list is used.

mod signature;
mod whitelist;

pub use signature::MagicSignature;
pub use whitelist::{
    global, whitelist_path, LazyWhitelist, SignatureSet, DEFAULT_WHITELIST_PATH, WHITELIST_ENV,
};
