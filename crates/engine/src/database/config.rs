//! Database configuration via `deskdb.toml`
//!
//! On first open, a default `deskdb.toml` is created in the data directory.
//! To change settings, edit the file and reopen the database.

use deskdb_core::{StoreError, StoreResult, DEFAULT_DAILY_COMMENT_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the database data directory.
pub const CONFIG_FILE_NAME: &str = "deskdb.toml";

/// Search tuning, persisted under the `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Hard cap on results (default: 20)
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Relevance at or above which a hit counts as high relevance (default: 80)
    #[serde(default = "default_high_relevance_threshold")]
    pub high_relevance_threshold: u32,
    /// Stop scanning after this many high-relevance hits (default: 10)
    #[serde(default = "default_max_high_relevance")]
    pub max_high_relevance: usize,
    /// Score the whole collection before truncating (default: false)
    #[serde(default)]
    pub exhaustive: bool,
    /// Search-as-you-type debounce window in milliseconds (default: 300)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_max_results() -> usize {
    20
}

fn default_high_relevance_threshold() -> u32 {
    80
}

fn default_max_high_relevance() -> usize {
    10
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_results: default_max_results(),
            high_relevance_threshold: default_high_relevance_threshold(),
            max_high_relevance: default_max_high_relevance(),
            exhaustive: false,
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Database configuration loaded from `deskdb.toml`.
///
/// # Example
///
/// ```toml
/// # quota_bytes = 5242880
/// daily_comment_limit = 100
///
/// [search]
/// max_results = 20
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeskConfig {
    /// Total bytes the slot store may hold; unlimited when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<u64>,
    /// Comments plus replies accepted per article per UTC day.
    #[serde(default = "default_daily_comment_limit")]
    pub daily_comment_limit: usize,
    /// Search tuning.
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_daily_comment_limit() -> usize {
    DEFAULT_DAILY_COMMENT_LIMIT
}

impl Default for DeskConfig {
    fn default() -> Self {
        DeskConfig {
            quota_bytes: None,
            daily_comment_limit: default_daily_comment_limit(),
            search: SearchConfig::default(),
        }
    }
}

impl DeskConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> StoreResult<()> {
        if self.search.max_results == 0 {
            return Err(StoreError::Config(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        if self.quota_bytes == Some(0) {
            return Err(StoreError::Config(
                "quota_bytes must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# DeskDB configuration
#
# Total bytes all partitions may occupy on disk. Unlimited when unset.
# quota_bytes = 5242880

# Comments plus replies accepted per article per UTC day.
daily_comment_limit = 100

[search]
# Maximum number of results returned by a search.
max_results = 20
# Hits scoring at least this much count as high relevance.
high_relevance_threshold = 80
# Scanning stops after this many high-relevance hits.
max_high_relevance = 10
# Score every article before truncating instead of stopping early.
exhaustive = false
# Search-as-you-type debounce window in milliseconds.
debounce_ms = 300
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: DeskConfig = toml::from_str(&content).map_err(|e| {
            StoreError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> StoreResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                StoreError::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> StoreResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StoreError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            StoreError::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
