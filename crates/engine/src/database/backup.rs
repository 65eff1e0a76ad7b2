//! Whole-store operations: export, backup, restore, clear, reset
//!
//! These take every partition lock in one fixed order (articles, users,
//! comments, newsletter, system) so they never interleave with each other
//! or with single-partition mutations.

use super::Database;
use crate::partition::{Partition, PartitionCell};
use deskdb_core::{
    Article, Comment, DatabaseExport, NewsletterSubscription, PartitionKind, StoreError,
    StoreResult, SystemMetadata, User, SCHEMA_VERSION,
};
use deskdb_storage::SlotStore;
use parking_lot::RwLockWriteGuard;
use tracing::{info, warn};

type Guard<'a, T> = RwLockWriteGuard<'a, Option<Partition<T>>>;

/// Write guards over every partition, acquired in slot order
struct AllPartitions<'a> {
    articles: Guard<'a, Article>,
    users: Guard<'a, User>,
    comments: Guard<'a, Comment>,
    newsletter: Guard<'a, NewsletterSubscription>,
    metadata: RwLockWriteGuard<'a, Option<SystemMetadata>>,
}

impl<'a> AllPartitions<'a> {
    fn drop_caches(&mut self) {
        *self.articles = None;
        *self.users = None;
        *self.comments = None;
        *self.newsletter = None;
        *self.metadata = None;
    }
}

impl Database {
    fn lock_all(&self) -> AllPartitions<'_> {
        AllPartitions {
            articles: self.articles.lock(),
            users: self.users.lock(),
            comments: self.comments.lock(),
            newsletter: self.newsletter.lock(),
            metadata: self.metadata.write(),
        }
    }

    fn export_locked(&self, all: &mut AllPartitions<'_>) -> StoreResult<DatabaseExport> {
        let slots = self.slots();
        let articles = PartitionCell::loaded(&mut all.articles, slots)?.records().to_vec();
        let users = PartitionCell::loaded(&mut all.users, slots)?.records().to_vec();
        let comments = PartitionCell::loaded(&mut all.comments, slots)?.records().to_vec();
        let newsletter = PartitionCell::loaded(&mut all.newsletter, slots)?.records().to_vec();
        let metadata = Self::metadata_loaded(&mut all.metadata, slots)?.clone();

        let mut export = DatabaseExport {
            version: metadata.version,
            metadata,
            articles,
            users,
            comments,
            newsletter,
        };
        let (articles, users, comments, protocols) = export.derived_counts();
        export.metadata.total_articles = articles;
        export.metadata.total_users = users;
        export.metadata.total_comments = comments;
        export.metadata.total_protocols = protocols;
        Ok(export)
    }

    /// Snapshot every partition plus system metadata
    ///
    /// Aggregate counts in the returned metadata are recomputed from the
    /// partitions; nothing is written.
    pub fn export(&self) -> StoreResult<DatabaseExport> {
        let mut all = self.lock_all();
        self.export_locked(&mut all)
    }

    /// Serialize the whole store to backup text and record the backup time
    ///
    /// The text carries the metadata as exported, so restoring it yields
    /// exactly the export taken before the backup.
    pub fn backup(&self) -> StoreResult<String> {
        self.backup_with(|_| Ok(()))
    }

    /// Like [`Database::backup`], handing the text to `sink` first
    ///
    /// The backup time is recorded only if `sink` succeeds; its error is
    /// returned unchanged and the metadata is left as it was.
    pub fn backup_with<F>(&self, sink: F) -> StoreResult<String>
    where
        F: FnOnce(&str) -> StoreResult<()>,
    {
        let mut all = self.lock_all();
        let export = self.export_locked(&mut all)?;
        let text = serde_json::to_string_pretty(&export)?;
        sink(&text)?;

        let slots = self.slots();
        let mut metadata = Self::metadata_loaded(&mut all.metadata, slots)?.clone();
        metadata.last_backup = Some(self.now());
        Self::store_metadata(slots, &metadata)?;
        *all.metadata = Some(metadata);

        info!(
            bytes = text.len(),
            articles = export.articles.len(),
            users = export.users.len(),
            "backup created"
        );
        Ok(text)
    }

    /// Replace every partition and the metadata from backup text
    ///
    /// Text that does not parse as a backup is rejected with `InvalidBackup`
    /// before anything is touched. If a slot write fails part way, slots
    /// already written are put back to their previous text and the write
    /// error is returned.
    pub fn restore_from_backup(&self, text: &str) -> StoreResult<()> {
        let export: DatabaseExport = serde_json::from_str(text).map_err(|e| {
            warn!(error = %e, "rejected backup text");
            StoreError::InvalidBackup(e.to_string())
        })?;
        if export.version > SCHEMA_VERSION {
            warn!(
                version = export.version,
                supported = SCHEMA_VERSION,
                "restoring backup written by a newer schema"
            );
        }

        let mut metadata = export.metadata;
        metadata.version = export.version;
        let articles = Partition::from_records(export.articles);
        let users = Partition::from_records(export.users);
        let comments = Partition::from_records(export.comments);
        let newsletter = Partition::from_records(export.newsletter);

        let writes = [
            (PartitionKind::Articles, articles.encode()?),
            (PartitionKind::Users, users.encode()?),
            (PartitionKind::Comments, comments.encode()?),
            (PartitionKind::Newsletter, newsletter.encode()?),
            (PartitionKind::System, serde_json::to_string(&metadata)?),
        ];

        let mut all = self.lock_all();
        let slots = self.slots();

        let mut previous = Vec::with_capacity(writes.len());
        for (kind, _) in &writes {
            previous.push(slots.get(kind.slot_name())?);
        }

        for (done, (kind, text)) in writes.iter().enumerate() {
            if let Err(e) = slots.set(kind.slot_name(), text) {
                warn!(partition = %kind, error = %e, "restore write failed, rolling back");
                rollback(slots, &writes[..done], &previous[..done]);
                all.drop_caches();
                return Err(e.into());
            }
        }

        *all.articles = Some(articles);
        *all.users = Some(users);
        *all.comments = Some(comments);
        *all.newsletter = Some(newsletter);
        *all.metadata = Some(metadata);

        info!(bytes = text.len(), "restored from backup");
        Ok(())
    }

    /// Remove every partition and reinitialize the metadata to defaults
    pub fn clear(&self) -> StoreResult<()> {
        let mut all = self.lock_all();
        let slots = self.slots();

        let result = (|| -> StoreResult<()> {
            for kind in [
                PartitionKind::Articles,
                PartitionKind::Users,
                PartitionKind::Comments,
                PartitionKind::Newsletter,
            ] {
                slots.remove(kind.slot_name())?;
            }
            Self::store_metadata(slots, &SystemMetadata::default())
        })();

        match result {
            Ok(()) => {
                *all.articles = Some(Partition::default());
                *all.users = Some(Partition::default());
                *all.comments = Some(Partition::default());
                *all.newsletter = Some(Partition::default());
                *all.metadata = Some(SystemMetadata::default());
                info!("database cleared");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "clear failed part way");
                all.drop_caches();
                Err(e)
            }
        }
    }

    /// Replace one partition with its empty state
    ///
    /// This is the recovery path for a partition reported as `Corrupt`;
    /// the unreadable text is discarded. Resetting `System` restores default
    /// metadata.
    pub fn reset_partition(&self, kind: PartitionKind) -> StoreResult<()> {
        let slots = self.slots();
        match kind {
            PartitionKind::Articles => reset_cell(&self.articles, slots)?,
            PartitionKind::Users => reset_cell(&self.users, slots)?,
            PartitionKind::Comments => reset_cell(&self.comments, slots)?,
            PartitionKind::Newsletter => reset_cell(&self.newsletter, slots)?,
            PartitionKind::System => {
                let mut state = self.metadata.write();
                let metadata = SystemMetadata::default();
                Self::store_metadata(slots, &metadata)?;
                *state = Some(metadata);
            }
        }
        warn!(partition = %kind, "partition reset to empty");
        Ok(())
    }
}

fn reset_cell<T: crate::partition::Lookup>(
    cell: &PartitionCell<T>,
    slots: &dyn SlotStore,
) -> StoreResult<()> {
    let mut state = cell.lock();
    let empty = Partition::<T>::default();
    slots.set(cell.kind().slot_name(), &empty.encode()?)?;
    *state = Some(empty);
    Ok(())
}

fn rollback(slots: &dyn SlotStore, written: &[(PartitionKind, String)], previous: &[Option<String>]) {
    for ((kind, _), old) in written.iter().zip(previous) {
        let slot = kind.slot_name();
        let result = match old {
            Some(text) => slots.set(slot, text),
            None => slots.remove(slot),
        };
        if let Err(e) = result {
            warn!(partition = %kind, error = %e, "rollback of restored slot failed");
        }
    }
}
