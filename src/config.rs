//! Cache sizing configuration.
//!
//! The only tunable is the maximum number of entries per cache. Resolution
//! order for the process-wide default returned by [`CacheConfig::global()`]:
//! 1. `RESOURCE_CACHE_MAX_ENTRIES` environment variable
//! 2. built-in default ([`DEFAULT_MAX_ENTRIES`])
//!
//! Deployments that keep settings in a file can load a `[cache]` table with
//! [`CacheConfig::load()`] and hand the result to
//! [`ResourceCacheBuilder::config()`](crate::ResourceCacheBuilder::config).

use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// Default maximum number of entries per cache.
pub const DEFAULT_MAX_ENTRIES: usize = 16;

/// Environment variable overriding [`DEFAULT_MAX_ENTRIES`].
pub const MAX_ENTRIES_ENV: &str = "RESOURCE_CACHE_MAX_ENTRIES";

static GLOBAL: LazyLock<CacheConfig> = LazyLock::new(|| {
    CacheConfig::from_env().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring invalid cache configuration, using defaults");
        CacheConfig::default()
    })
});

/// Configuration for a [`ResourceCache`](crate::ResourceCache).
///
/// ```rust
/// # use resource_cache::CacheConfig;
/// let config = CacheConfig::new().max_entries(64);
/// assert_eq!(config.max_entries, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of distinct keys held before LRU eviction. Default: 16.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

/// On-disk layout: settings live under a `[cache]` table.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    cache: CacheConfig,
}

impl CacheConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Process-wide default, resolved once on first use.
    pub fn global() -> &'static CacheConfig {
        &GLOBAL
    }

    /// Defaults overridden by `RESOURCE_CACHE_MAX_ENTRIES` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(MAX_ENTRIES_ENV) {
            Ok(raw) => Self::default().with_max_entries_str(&raw),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse a TOML document containing an optional `[cache]` table.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.cache)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Capacity actually enforced by the cache. Zero is treated as one.
    pub fn effective_max_entries(&self) -> usize {
        self.max_entries.max(1)
    }

    fn with_max_entries_str(self, raw: &str) -> Result<Self, ConfigError> {
        let n = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidValue {
                name: MAX_ENTRIES_ENV,
                value: raw.to_string(),
            })?;
        Ok(self.max_entries(n))
    }
}
