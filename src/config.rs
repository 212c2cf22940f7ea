//! Gateway configuration.
//!
//! Everything has a default, so an empty TOML file (or no file at all) is
//! a valid configuration:
//!
//! ```toml
//! [clamd]
//! host = "127.0.0.1"
//! port = 3310
//! timeout = 2000          # milliseconds
//! chunk_size = 2048
//! max_stream_size = 20480000
//!
//! [whitelist]
//! path = "/etc/clamgate/magic.txt"
//! ```
//!
//! `CLAMD_HOST`, `CLAMD_PORT`, `CLAMD_TIMEOUT` and `MAGIC_WHITELIST`
//! override the file when [`GatewayConfig::apply_env`] is called.

use crate::core::{ScanError, ScanResult};
use crate::magic::{DEFAULT_WHITELIST_PATH, WHITELIST_ENV};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection settings for a clamd daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClamdConfig {
    /// Daemon host name or address.
    pub host: String,

    /// Daemon TCP port.
    pub port: u16,

    /// Bound on connecting and on each read or write.
    #[serde(with = "duration_millis")]
    pub timeout: Duration,

    /// Size of each INSTREAM chunk.
    pub chunk_size: usize,

    /// Largest stream the client will send. Must not exceed clamd's
    /// `StreamMaxLength`, or clamd will cut the stream off itself.
    pub max_stream_size: u64,
}

impl Default for ClamdConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3310,
            timeout: Duration::from_millis(2000),
            chunk_size: 2048,
            max_stream_size: 20_000 * 1024,
        }
    }
}

impl ClamdConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the I/O timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the INSTREAM chunk size.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the largest stream the client will send.
    pub fn with_max_stream_size(mut self, size: u64) -> Self {
        self.max_stream_size = size;
        self
    }

    /// `host:port`, as handed to the socket layer.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Rejects values the client cannot work with.
    pub fn validate(&self) -> ScanResult<()> {
        if self.host.trim().is_empty() {
            return Err(ScanError::configuration("clamd host must not be empty"));
        }
        if self.port == 0 {
            return Err(ScanError::configuration("clamd port must not be 0"));
        }
        if self.timeout.is_zero() {
            return Err(ScanError::configuration("clamd timeout must be positive"));
        }
        if self.chunk_size == 0 || self.chunk_size > u32::MAX as usize {
            return Err(ScanError::configuration(
                "clamd chunk_size must be between 1 and u32::MAX",
            ));
        }
        Ok(())
    }
}

/// Where the magic whitelist lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitelistConfig {
    /// Path of the whitelist file.
    pub path: PathBuf,
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_WHITELIST_PATH),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// clamd connection settings.
    pub clamd: ClamdConfig,

    /// Whitelist location.
    pub whitelist: WhitelistConfig,
}

impl GatewayConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> ScanResult<Self> {
        toml::from_str(text).map_err(|e| ScanError::configuration(e.to_string()))
    }

    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> ScanResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ScanError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Applies environment overrides from the process environment.
    pub fn apply_env(self) -> ScanResult<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`.
    ///
    /// Unset and blank variables are ignored; unparsable ones are errors.
    pub fn apply_overrides<F>(mut self, lookup: F) -> ScanResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("CLAMD_HOST") {
            self.clamd.host = host;
        }
        if let Some(port) = get("CLAMD_PORT") {
            self.clamd.port = port.trim().parse().map_err(|_| {
                ScanError::configuration(format!("CLAMD_PORT is not a port: {}", port))
            })?;
        }
        if let Some(timeout) = get("CLAMD_TIMEOUT") {
            let millis: u64 = timeout.trim().parse().map_err(|_| {
                ScanError::configuration(format!(
                    "CLAMD_TIMEOUT is not a number of milliseconds: {}",
                    timeout
                ))
            })?;
            self.clamd.timeout = Duration::from_millis(millis);
        }
        if let Some(path) = get(WHITELIST_ENV) {
            self.whitelist.path = PathBuf::from(path);
        }

        Ok(self)
    }

    /// Validates every section.
    pub fn validate(&self) -> ScanResult<()> {
        self.clamd.validate()
    }
}

/// Serde helper for durations stored as milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.clamd.address(), "127.0.0.1:3310");
        assert_eq!(config.clamd.timeout, Duration::from_millis(2000));
        assert_eq!(config.whitelist.path, PathBuf::from(DEFAULT_WHITELIST_PATH));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = GatewayConfig::from_toml_str("").unwrap();
        assert_eq!(config, GatewayConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [clamd]
            host = "clamd.internal"
            timeout = 500

            [whitelist]
            path = "/srv/magic.txt"
            "#,
        )
        .unwrap();

        assert_eq!(config.clamd.host, "clamd.internal");
        assert_eq!(config.clamd.port, 3310);
        assert_eq!(config.clamd.timeout, Duration::from_millis(500));
        assert_eq!(config.whitelist.path, PathBuf::from("/srv/magic.txt"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = GatewayConfig::from_toml_str("[clamd]\nport = \"nope\"").unwrap_err();
        assert!(matches!(err, ScanError::Configuration { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CLAMD_HOST", "10.0.0.5"),
            ("CLAMD_PORT", "3311"),
            ("CLAMD_TIMEOUT", "750"),
            ("MAGIC_WHITELIST", "/opt/magic.txt"),
        ]
        .into_iter()
        .collect();

        let config = GatewayConfig::default()
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.clamd.address(), "10.0.0.5:3311");
        assert_eq!(config.clamd.timeout, Duration::from_millis(750));
        assert_eq!(config.whitelist.path, PathBuf::from("/opt/magic.txt"));
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let config = GatewayConfig::default()
            .apply_overrides(|_| Some("  ".to_string()))
            .unwrap();
        assert_eq!(config, GatewayConfig::default());
    }

    #[test]
    fn test_bad_env_port() {
        let err = GatewayConfig::default()
            .apply_overrides(|k| (k == "CLAMD_PORT").then(|| "70000".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("CLAMD_PORT"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClamdConfig::new().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
