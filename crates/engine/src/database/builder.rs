//! Database builder for fluent configuration
//!
//! Provides a builder pattern for opening databases with a custom medium,
//! clock, limits or configuration.

use std::path::PathBuf;
use std::sync::Arc;

use deskdb_core::{Limits, StoreResult};
use deskdb_storage::{FileSlots, MemorySlots, Quota, SlotStore};

use super::{Database, DeskConfig, CONFIG_FILE_NAME};
use crate::clock::{Clock, SystemClock};

// ============================================================================
// Database Builder Pattern
// ============================================================================

/// Builder for Database configuration
///
/// # Three Ways to Open a Database
///
/// ```ignore
/// use deskdb_engine::Database;
///
/// // 1. Directory with settings from deskdb.toml
/// let db = Database::open("/data/desk")?;
///
/// // 2. Builder for custom settings
/// let db = Database::builder()
///     .path("/data/desk")
///     .quota_bytes(5 * 1024 * 1024)
///     .open()?;
///
/// // 3. Ephemeral (no files, testing)
/// let db = Database::ephemeral();
/// ```
///
/// Without a path or explicit slot store the builder opens an in-memory
/// database. Explicit settings override `deskdb.toml`; the file is only
/// read when no config was given.
pub struct DatabaseBuilder {
    path: Option<PathBuf>,
    slots: Option<Arc<dyn SlotStore>>,
    config: Option<DeskConfig>,
    quota_bytes: Option<u64>,
    limits: Limits,
    clock: Arc<dyn Clock>,
}

impl DatabaseBuilder {
    /// Create new builder with defaults
    pub fn new() -> Self {
        Self {
            path: None,
            slots: None,
            config: None,
            quota_bytes: None,
            limits: Limits::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Store partitions as files in this directory
    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Use an existing slot store (takes precedence over `path`)
    pub fn slots(mut self, slots: Arc<dyn SlotStore>) -> Self {
        self.slots = Some(slots);
        self
    }

    /// Use this configuration instead of reading `deskdb.toml`
    pub fn config(mut self, config: DeskConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Limit total stored bytes
    pub fn quota_bytes(mut self, bytes: u64) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    /// Input limits for titles, comments, usernames and tags
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Time source for record timestamps
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Open the database
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The configuration is invalid
    /// - The directory or its config file cannot be created or read
    pub fn open(self) -> StoreResult<Arc<Database>> {
        let mut config = match (self.config, &self.path) {
            (Some(config), _) => config,
            (None, Some(path)) if self.slots.is_none() => {
                std::fs::create_dir_all(path)?;
                let config_path = path.join(CONFIG_FILE_NAME);
                DeskConfig::write_default_if_missing(&config_path)?;
                DeskConfig::from_file(&config_path)?
            }
            (None, _) => DeskConfig::default(),
        };
        if let Some(bytes) = self.quota_bytes {
            config.quota_bytes = Some(bytes);
        }
        config.validate()?;

        let quota = config.quota_bytes.map(Quota::bytes).unwrap_or_default();
        let (data_dir, slots): (Option<PathBuf>, Arc<dyn SlotStore>) = match (self.slots, self.path) {
            (Some(slots), path) => (path, slots),
            (None, Some(path)) => {
                let slots = FileSlots::open(&path, quota)?;
                (Some(path), Arc::new(slots))
            }
            (None, None) => (None, Arc::new(MemorySlots::with_quota(quota))),
        };

        Ok(Arc::new(Database::from_parts(
            data_dir,
            slots,
            config,
            self.limits,
            self.clock,
        )))
    }
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
