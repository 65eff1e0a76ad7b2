//! Database struct and open logic
//!
//! This module provides the main Database struct, the local store behind
//! the research site. It owns:
//! - The slot store (memory or directory) the partitions are written to
//! - One lazily-loaded cache per partition
//! - Configuration (`deskdb.toml`) and input limits
//! - The clock used for timestamps
//!
//! Record operations live on the facades in [`crate::primitives`]; whole-store
//! operations (export, backup, restore, clear) live in `backup.rs`.
//!
//! ## Handles
//!
//! There is no global store. Open a `Database` once at startup and pass the
//! `Arc<Database>` to whatever needs it. Two databases opened on the same
//! directory do not coordinate: the last slot write wins.

mod backup;
pub mod builder;
pub mod config;

pub use builder::DatabaseBuilder;
pub use config::{DeskConfig, SearchConfig, CONFIG_FILE_NAME};

use crate::clock::{Clock, SystemClock};
use crate::partition::PartitionCell;
use chrono::{DateTime, Utc};
use deskdb_core::{
    Article, Comment, Limits, NewsletterSubscription, PartitionKind, StoreError, StoreResult,
    SystemMetadata, User,
};
use deskdb_storage::{FileSlots, MemorySlots, Quota, SlotStore};
use parking_lot::{RwLock, RwLockWriteGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// The local store
///
/// Create one with [`Database::open`], [`Database::ephemeral`] or
/// [`Database::builder`], then hand clones of the `Arc` to the record
/// facades (`ArticleStore::new(db.clone())`, ...).
pub struct Database {
    /// Data directory (None for ephemeral databases)
    data_dir: Option<PathBuf>,

    /// Persistent medium
    slots: Arc<dyn SlotStore>,

    /// Settings from `deskdb.toml`
    config: DeskConfig,

    /// Input limits
    limits: Limits,

    /// Time source
    clock: Arc<dyn Clock>,

    pub(crate) articles: PartitionCell<Article>,
    pub(crate) users: PartitionCell<User>,
    pub(crate) comments: PartitionCell<Comment>,
    pub(crate) newsletter: PartitionCell<NewsletterSubscription>,
    pub(crate) metadata: RwLock<Option<SystemMetadata>>,
}

impl Database {
    /// Open a database directory
    ///
    /// Reads `deskdb.toml` from the directory, creating it with defaults if
    /// missing. Partitions are loaded lazily on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the config
    /// file is invalid.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Arc<Self>> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        DeskConfig::write_default_if_missing(&config_path)?;
        let config = DeskConfig::from_file(&config_path)?;

        Self::open_with_config(data_dir, config)
    }

    /// Open a database directory with an explicit configuration
    ///
    /// The config file in the directory is neither read nor written.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: DeskConfig) -> StoreResult<Arc<Self>> {
        config.validate()?;
        let data_dir = path.as_ref().to_path_buf();
        let quota = config.quota_bytes.map(Quota::bytes).unwrap_or_default();
        let slots = FileSlots::open(&data_dir, quota)?;
        let db = Self::from_parts(
            Some(data_dir),
            Arc::new(slots),
            config,
            Limits::default(),
            Arc::new(SystemClock),
        );
        Ok(Arc::new(db))
    }

    /// In-memory database with default settings; nothing touches disk
    pub fn ephemeral() -> Arc<Self> {
        Arc::new(Self::from_parts(
            None,
            Arc::new(MemorySlots::new()),
            DeskConfig::default(),
            Limits::default(),
            Arc::new(SystemClock),
        ))
    }

    /// Builder for custom slot stores, clocks, limits and configs
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    pub(crate) fn from_parts(
        data_dir: Option<PathBuf>,
        slots: Arc<dyn SlotStore>,
        config: DeskConfig,
        limits: Limits,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            backend = slots.name(),
            dir = ?data_dir,
            quota = ?config.quota_bytes,
            "opened database"
        );
        Database {
            data_dir,
            slots,
            config,
            limits,
            clock,
            articles: PartitionCell::default(),
            users: PartitionCell::default(),
            comments: PartitionCell::default(),
            newsletter: PartitionCell::default(),
            metadata: RwLock::new(None),
        }
    }

    /// Data directory, `None` for ephemeral databases
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Active configuration
    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// Input limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Current time according to the database clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The slot store partitions are written to
    pub fn slots(&self) -> &dyn SlotStore {
        self.slots.as_ref()
    }

    /// Bytes currently used on the medium
    pub fn used_bytes(&self) -> StoreResult<u64> {
        Ok(self.slots.used_bytes()?)
    }

    /// Drop every cached partition
    ///
    /// The next access re-reads the medium, picking up writes made through
    /// another handle on the same directory.
    pub fn reload(&self) {
        self.articles.invalidate();
        self.users.invalidate();
        self.comments.invalidate();
        self.newsletter.invalidate();
        *self.metadata.write() = None;
    }

    // ========================================================================
    // System metadata
    // ========================================================================

    pub(crate) fn load_metadata(slots: &dyn SlotStore) -> StoreResult<SystemMetadata> {
        let slot = PartitionKind::System.slot_name();
        match slots.get(slot)? {
            None => Ok(SystemMetadata::default()),
            Some(text) => serde_json::from_str(&text).map_err(|e| {
                warn!(partition = slot, error = %e, "system metadata is corrupt");
                StoreError::corrupt(PartitionKind::System, e.to_string())
            }),
        }
    }

    pub(crate) fn metadata_loaded<'a>(
        guard: &'a mut RwLockWriteGuard<'_, Option<SystemMetadata>>,
        slots: &dyn SlotStore,
    ) -> StoreResult<&'a mut SystemMetadata> {
        let metadata = match guard.take() {
            Some(m) => m,
            None => Self::load_metadata(slots)?,
        };
        Ok(guard.insert(metadata))
    }

    pub(crate) fn store_metadata(slots: &dyn SlotStore, metadata: &SystemMetadata) -> StoreResult<()> {
        let text = serde_json::to_string(metadata)?;
        slots.set(PartitionKind::System.slot_name(), &text)?;
        Ok(())
    }

    /// Aggregate counts computed from the partitions right now
    fn live_counts(&self) -> StoreResult<(usize, usize, usize, usize)> {
        let slots = self.slots();
        let (articles, protocols) = self.articles.read(slots, |p| {
            let published = p.records().iter().filter(|a| a.is_published()).count();
            (p.len(), published)
        })?;
        let users = self.users.read(slots, |p| p.len())?;
        let comments = self.comments.read(slots, |p| {
            p.records().iter().map(|c| 1 + c.replies.len()).sum::<usize>()
        })?;
        Ok((articles, users, comments, protocols))
    }

    /// System metadata with aggregate counts computed from the partitions
    ///
    /// Does not write; see [`Database::refresh_metadata`].
    pub fn system_metadata(&self) -> StoreResult<SystemMetadata> {
        let (articles, users, comments, protocols) = self.live_counts()?;
        let mut state = self.metadata.write();
        let mut metadata = Self::metadata_loaded(&mut state, self.slots())?.clone();
        metadata.total_articles = articles;
        metadata.total_users = users;
        metadata.total_comments = comments;
        metadata.total_protocols = protocols;
        Ok(metadata)
    }

    /// Recompute the aggregate counts and persist them
    pub fn refresh_metadata(&self) -> StoreResult<SystemMetadata> {
        let metadata = self.system_metadata()?;
        let mut state = self.metadata.write();
        Self::store_metadata(self.slots(), &metadata)?;
        *state = Some(metadata.clone());
        Ok(metadata)
    }
}
