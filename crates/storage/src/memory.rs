//! In-memory slot store for ephemeral databases and tests

use crate::slots::{validate_slot_name, Quota, SlotStore, StorageError};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Slot store backed by a `BTreeMap`, lost when dropped
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: RwLock<BTreeMap<String, String>>,
    quota: Quota,
}

impl MemorySlots {
    /// Empty, unlimited store
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with a byte quota
    pub fn with_quota(quota: Quota) -> Self {
        MemorySlots {
            slots: RwLock::new(BTreeMap::new()),
            quota,
        }
    }
}

impl SlotStore for MemorySlots {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        validate_slot_name(slot)?;
        Ok(self.slots.read().get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        validate_slot_name(slot)?;
        let mut slots = self.slots.write();
        let used: u64 = slots.values().map(|v| v.len() as u64).sum();
        let old_len = slots.get(slot).map(|v| v.len() as u64).unwrap_or(0);
        self.quota.check(slot, used, old_len, value.len() as u64)?;
        slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), StorageError> {
        validate_slot_name(slot)?;
        self.slots.write().remove(slot);
        Ok(())
    }

    fn slots(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.slots.read().keys().cloned().collect())
    }

    fn used_bytes(&self) -> Result<u64, StorageError> {
        Ok(self.slots.read().values().map(|v| v.len() as u64).sum())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
