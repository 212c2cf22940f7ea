//! The signature set and its process-wide cache.

use crate::magic::signature::MagicSignature;

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Whitelist location used when `MAGIC_WHITELIST` is not set.
pub const DEFAULT_WHITELIST_PATH: &str = "/etc/clamgate/magic.txt";

/// Environment variable naming the whitelist file.
pub const WHITELIST_ENV: &str = "MAGIC_WHITELIST";

const BUILTIN_WHITELIST: &str = include_str!("default_magic.txt");

static GLOBAL: OnceLock<Arc<SignatureSet>> = OnceLock::new();

/// An immutable, ordered set of magic signatures.
///
/// Order is file order. It only affects how quickly a match is found,
/// never whether one is found.
///
/// # Examples
///
/// ```rust
/// use clamgate::magic::SignatureSet;
///
/// let set = SignatureSet::parse("# PNG\n0,89 50 4E 47\n");
/// assert_eq!(set.len(), 1);
/// assert!(set.is_whitelisted(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]));
/// assert!(!set.is_whitelisted(&[0x00, 0x50, 0x4E, 0x47]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureSet {
    signatures: Vec<MagicSignature>,
}

impl SignatureSet {
    /// A set that whitelists nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a set from whitelist lines, skipping anything that is not a
    /// well-formed record.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let signatures: Vec<MagicSignature> = lines
            .into_iter()
            .filter_map(|line| MagicSignature::parse(line.as_ref()))
            .collect();

        tracing::info!(count = signatures.len(), "Loaded magic signatures");
        Self { signatures }
    }

    /// Builds a set from the text of a whitelist file.
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// The compiled-in default list (GIF, TIFF, PDF, JPEG, BMP, PNG).
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_WHITELIST)
    }

    /// Loads the whitelist at `path`.
    ///
    /// An unreadable file is not an error: the built-in list is used instead
    /// and the fallback is logged.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), "Reading magic whitelist");
                Self::parse(&text)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot read magic whitelist, falling back to the built-in list"
                );
                Self::builtin()
            }
        }
    }

    /// Returns `true` if any signature matches `data`.
    pub fn is_whitelisted(&self, data: &[u8]) -> bool {
        self.find_match(data).is_some()
    }

    /// Returns the first signature matching `data`.
    pub fn find_match(&self, data: &[u8]) -> Option<&MagicSignature> {
        let found = self.signatures.iter().find(|sig| sig.matches(data));
        tracing::trace!(matched = ?found.map(|s| s.to_string()), "Magic whitelist checked");
        found
    }

    /// Number of signatures.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Returns `true` if the set holds no signatures.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Iterates over the signatures in file order.
    pub fn iter(&self) -> impl Iterator<Item = &MagicSignature> {
        self.signatures.iter()
    }
}

impl FromIterator<MagicSignature> for SignatureSet {
    fn from_iter<T: IntoIterator<Item = MagicSignature>>(iter: T) -> Self {
        Self {
            signatures: iter.into_iter().collect(),
        }
    }
}

/// Resolves the whitelist location from `MAGIC_WHITELIST`, or the default path.
pub fn whitelist_path() -> PathBuf {
    match std::env::var(WHITELIST_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_WHITELIST_PATH),
    }
}

/// A signature set that is built on first use and shared afterwards.
///
/// Concurrent first callers block until the single construction finishes;
/// reads after that are lock-free.
#[derive(Debug)]
pub struct LazyWhitelist {
    path: PathBuf,
    cell: OnceLock<Arc<SignatureSet>>,
}

impl LazyWhitelist {
    /// Creates a lazy whitelist backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }

    /// The file this whitelist loads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the set, loading it on the first call.
    pub fn get(&self) -> Arc<SignatureSet> {
        self.get_or_init_with(|| SignatureSet::load(&self.path))
    }

    /// Returns the set, building it with `init` on the first call.
    ///
    /// `init` runs at most once no matter how many threads race here.
    pub fn get_or_init_with<F>(&self, init: F) -> Arc<SignatureSet>
    where
        F: FnOnce() -> SignatureSet,
    {
        Arc::clone(self.cell.get_or_init(|| Arc::new(init())))
    }

    /// Returns `true` once the set has been built.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// The process-wide whitelist, loaded from [`whitelist_path`] on first use.
pub fn global() -> Arc<SignatureSet> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(SignatureSet::load(&whitelist_path()))))
}
