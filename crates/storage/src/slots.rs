//! Slot store abstraction
//!
//! A slot store is a flat, synchronous string-to-string medium: one named
//! slot per partition, each holding the partition's serialized text. The
//! engine reads and rewrites whole slots; there is no partial update.

use deskdb_core::StoreError;
use std::io;
use thiserror::Error;

/// Errors raised by a slot store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Write rejected because the medium would exceed its quota
    #[error("quota exceeded writing slot '{slot}': {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        /// Slot being written
        slot: String,
        /// Bytes the medium would hold after the write
        needed: u64,
        /// Configured limit
        limit: u64,
    },

    /// Slot names are restricted to `[a-z0-9_-]`
    #[error("invalid slot name '{0}'")]
    InvalidSlotName(String),

    /// Stored bytes are not valid UTF-8
    #[error("slot '{0}' does not contain UTF-8 text")]
    NotUtf8(String),
}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::QuotaExceeded {
                slot,
                needed,
                limit,
            } => StoreError::QuotaExceeded {
                slot,
                needed,
                limit,
            },
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Synchronous key-value medium for serialized partitions
///
/// Implementations must be safe to call from multiple threads. Writes
/// replace the whole slot; readers see either the old or the new text.
pub trait SlotStore: Send + Sync {
    /// Read a slot; `None` if it was never written or was removed
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's text
    fn set(&self, slot: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a slot; removing an absent slot is not an error
    fn remove(&self, slot: &str) -> Result<(), StorageError>;

    /// Names of all present slots, sorted
    fn slots(&self) -> Result<Vec<String>, StorageError>;

    /// Total bytes currently stored
    fn used_bytes(&self) -> Result<u64, StorageError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Reject names that could escape a directory or collide with temp files
pub fn validate_slot_name(slot: &str) -> Result<(), StorageError> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidSlotName(slot.to_string()))
    }
}

/// Optional byte budget shared by the slot store implementations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quota {
    limit: Option<u64>,
}

impl Quota {
    /// No limit
    pub fn unlimited() -> Self {
        Quota { limit: None }
    }

    /// Limit total stored bytes
    pub fn bytes(limit: u64) -> Self {
        Quota { limit: Some(limit) }
    }

    /// Configured limit, if any
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Check replacing `old_len` bytes in `slot` with `new_len` bytes
    pub fn check(
        &self,
        slot: &str,
        used: u64,
        old_len: u64,
        new_len: u64,
    ) -> Result<(), StorageError> {
        if let Some(limit) = self.limit {
            let needed = used.saturating_sub(old_len) + new_len;
            if needed > limit {
                tracing::warn!(slot, needed, limit, "slot write rejected by quota");
                return Err(StorageError::QuotaExceeded {
                    slot: slot.to_string(),
                    needed,
                    limit,
                });
            }
        }
        Ok(())
    }
}
