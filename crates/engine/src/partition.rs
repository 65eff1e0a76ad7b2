//! Partitions: ordered record lists with lookup indices
//!
//! A partition keeps its records in insertion order (the order listings and
//! backups use) plus a map from id to position and a map from secondary
//! lookup keys (slug, username, email, reply id) to position. Indices are
//! rebuilt after every mutation; mutations already rewrite the whole slot,
//! so the rebuild does not change the cost class.
//!
//! [`PartitionCell`] is the lazily-loaded, lock-protected cache of one
//! partition. Mutations run against a copy which only replaces the cached
//! partition after the slot write succeeded, so a failed write (quota,
//! I/O) leaves both the cache and the medium at the previous state.

use deskdb_core::{
    normalize_email, Article, Comment, NewsletterSubscription, PartitionKind, Record, StoreError,
    StoreResult, User,
};
use deskdb_storage::SlotStore;
use parking_lot::{RwLock, RwLockWriteGuard};
use std::collections::HashMap;
use tracing::{debug, warn};

// ============================================================================
// Lookup keys
// ============================================================================

/// Secondary lookup keys a record is reachable by
pub trait Lookup: Record {
    /// `(key kind, normalized value)` pairs for this record
    fn lookup_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Key kind for article slugs
pub const SLUG: &str = "slug";
/// Key kind for usernames (lowercased)
pub const USERNAME: &str = "username";
/// Key kind for emails (normalized)
pub const EMAIL: &str = "email";
/// Key kind mapping a reply id to its parent comment
pub const REPLY: &str = "reply";

impl Lookup for Article {
    fn lookup_keys(&self) -> Vec<(&'static str, String)> {
        vec![(SLUG, self.slug.clone())]
    }
}

impl Lookup for User {
    fn lookup_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            (USERNAME, self.username.to_ascii_lowercase()),
            (EMAIL, normalize_email(&self.email)),
        ]
    }
}

impl Lookup for Comment {
    fn lookup_keys(&self) -> Vec<(&'static str, String)> {
        self.replies.iter().map(|r| (REPLY, r.id.clone())).collect()
    }
}

impl Lookup for NewsletterSubscription {
    fn lookup_keys(&self) -> Vec<(&'static str, String)> {
        vec![(EMAIL, normalize_email(&self.email))]
    }
}

// ============================================================================
// Partition
// ============================================================================

/// In-memory image of one partition
#[derive(Debug, Clone)]
pub struct Partition<T> {
    records: Vec<T>,
    by_id: HashMap<String, usize>,
    by_key: HashMap<(&'static str, String), usize>,
}

impl<T: Lookup> Default for Partition<T> {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl<T: Lookup> Partition<T> {
    /// Build a partition and its indices from records in stored order
    pub fn from_records(records: Vec<T>) -> Self {
        let mut partition = Partition {
            records,
            by_id: HashMap::new(),
            by_key: HashMap::new(),
        };
        partition.reindex();
        partition
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        self.by_key.clear();
        for (pos, record) in self.records.iter().enumerate() {
            // First occurrence wins so lookups agree with a linear scan
            self.by_id.entry(record.id().to_string()).or_insert(pos);
            for key in record.lookup_keys() {
                self.by_key.entry(key).or_insert(pos);
            }
        }
    }

    /// Records in insertion order
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the partition holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record by id
    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id).map(|&pos| &self.records[pos])
    }

    /// Record by secondary key
    pub fn find_by(&self, kind: &'static str, value: &str) -> Option<&T> {
        self.by_key
            .get(&(kind, value.to_string()))
            .map(|&pos| &self.records[pos])
    }

    /// True if some record other than `except_id` holds the key
    pub fn key_taken(&self, kind: &'static str, value: &str, except_id: Option<&str>) -> bool {
        match self.find_by(kind, value) {
            Some(record) => Some(record.id()) != except_id,
            None => false,
        }
    }

    /// Append a record
    pub fn push(&mut self, record: T) {
        self.records.push(record);
        self.reindex();
    }

    /// Apply `f` to the record with `id`; `None` if absent
    pub fn update<R>(&mut self, id: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let pos = *self.by_id.get(id)?;
        let result = f(&mut self.records[pos]);
        self.reindex();
        Some(result)
    }

    /// Apply `f` to the record reachable through a secondary key
    pub fn update_by<R>(
        &mut self,
        kind: &'static str,
        value: &str,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let pos = *self.by_key.get(&(kind, value.to_string()))?;
        let result = f(&mut self.records[pos]);
        self.reindex();
        Some(result)
    }

    /// Remove every record with `id`; returns true if any was removed
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        let removed = self.records.len() != before;
        if removed {
            self.reindex();
        }
        removed
    }

    /// Serialize for the slot
    pub fn encode(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(&self.records)?)
    }
}

/// Parse slot text into a partition
pub fn decode<T: Lookup>(text: &str) -> StoreResult<Partition<T>> {
    let records: Vec<T> =
        serde_json::from_str(text).map_err(|e| StoreError::corrupt(T::PARTITION, e.to_string()))?;
    Ok(Partition::from_records(records))
}

// ============================================================================
// PartitionCell
// ============================================================================

/// Lazily-loaded cache of one partition
pub struct PartitionCell<T> {
    state: RwLock<Option<Partition<T>>>,
}

impl<T: Lookup> Default for PartitionCell<T> {
    fn default() -> Self {
        PartitionCell {
            state: RwLock::new(None),
        }
    }
}

impl<T: Lookup> PartitionCell<T> {
    /// Partition kind of this cell
    pub fn kind(&self) -> PartitionKind {
        T::PARTITION
    }

    /// Read the partition from the medium
    ///
    /// An absent slot reads as an empty partition. Unparseable text is a
    /// `Corrupt` error and is never cached, so every access reports it
    /// until the partition is reset or restored.
    pub fn load(slots: &dyn SlotStore) -> StoreResult<Partition<T>> {
        let slot = T::PARTITION.slot_name();
        match slots.get(slot)? {
            None => {
                debug!(partition = slot, "partition absent, starting empty");
                Ok(Partition::default())
            }
            Some(text) => decode(&text).map_err(|e| {
                warn!(partition = slot, error = %e, "partition data is corrupt");
                e
            }),
        }
    }

    /// Ensure the guarded partition is loaded and borrow it
    pub fn loaded<'a>(
        guard: &'a mut RwLockWriteGuard<'_, Option<Partition<T>>>,
        slots: &dyn SlotStore,
    ) -> StoreResult<&'a mut Partition<T>> {
        let partition = match guard.take() {
            Some(p) => p,
            None => Self::load(slots)?,
        };
        Ok(guard.insert(partition))
    }

    /// Exclusive access for multi-partition operations
    pub fn lock(&self) -> RwLockWriteGuard<'_, Option<Partition<T>>> {
        self.state.write()
    }

    /// Run `f` against the loaded partition
    pub fn read<R>(&self, slots: &dyn SlotStore, f: impl FnOnce(&Partition<T>) -> R) -> StoreResult<R> {
        {
            let state = self.state.read();
            if let Some(partition) = state.as_ref() {
                return Ok(f(partition));
            }
        }
        let mut state = self.state.write();
        let partition = Self::loaded(&mut state, slots)?;
        Ok(f(partition))
    }

    /// Read-modify-write: run `f` on a copy, persist it, then publish it
    pub fn mutate<R>(
        &self,
        slots: &dyn SlotStore,
        f: impl FnOnce(&mut Partition<T>) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut state = self.state.write();
        let current = Self::loaded(&mut state, slots)?;
        let mut next = current.clone();
        let result = f(&mut next)?;
        slots.set(T::PARTITION.slot_name(), &next.encode()?)?;
        *current = next;
        Ok(result)
    }

    /// Forget the cached partition; the next access re-reads the medium
    pub fn invalidate(&self) {
        *self.state.write() = None;
    }
}
