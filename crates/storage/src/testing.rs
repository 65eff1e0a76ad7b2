//! Fault injection for slot stores
//!
//! Wraps any [`SlotStore`] and fails reads or writes on demand, so engine
//! tests can exercise the unavailable-medium and rollback paths.
//!
//! # Example
//!
//! ```ignore
//! use deskdb_storage::{MemorySlots, testing::FaultySlots};
//!
//! let slots = FaultySlots::new(MemorySlots::new());
//! slots.fail_writes_after(2); // third and later writes fail
//! slots.fail_one_write_after(2); // only the third write fails
//! ```

use crate::slots::{SlotStore, StorageError};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Slot store wrapper with injectable failures
#[derive(Debug)]
pub struct FaultySlots<S> {
    inner: S,
    writes_armed: AtomicBool,
    writes_remaining: AtomicUsize,
    one_shot: AtomicBool,
    fail_reads: AtomicBool,
}

impl<S: SlotStore> FaultySlots<S> {
    /// Wrap `inner` with no faults armed
    pub fn new(inner: S) -> Self {
        FaultySlots {
            inner,
            writes_armed: AtomicBool::new(false),
            writes_remaining: AtomicUsize::new(0),
            one_shot: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Allow `n` more successful writes, then fail every write
    pub fn fail_writes_after(&self, n: usize) {
        self.arm(n, false);
    }

    /// Allow `n` more successful writes, fail the next one, then disarm
    pub fn fail_one_write_after(&self, n: usize) {
        self.arm(n, true);
    }

    fn arm(&self, n: usize, one_shot: bool) {
        self.writes_remaining.store(n, Ordering::SeqCst);
        self.one_shot.store(one_shot, Ordering::SeqCst);
        self.writes_armed.store(true, Ordering::SeqCst);
    }

    /// Make every read fail until `heal` is called
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Disarm all faults
    pub fn heal(&self) {
        self.writes_armed.store(false, Ordering::SeqCst);
        self.fail_reads.store(false, Ordering::SeqCst);
    }

    /// Wrapped store, bypassing fault injection
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check_write(&self) -> Result<(), StorageError> {
        if !self.writes_armed.load(Ordering::SeqCst) {
            return Ok(());
        }
        let allowed = self
            .writes_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if allowed {
            Ok(())
        } else {
            if self.one_shot.load(Ordering::SeqCst) {
                self.writes_armed.store(false, Ordering::SeqCst);
            }
            Err(io::Error::new(io::ErrorKind::Other, "injected write failure").into())
        }
    }

    fn check_read(&self) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(io::Error::new(io::ErrorKind::Other, "injected read failure").into())
        } else {
            Ok(())
        }
    }
}

impl<S: SlotStore> SlotStore for FaultySlots<S> {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        self.check_read()?;
        self.inner.get(slot)
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        self.check_write()?;
        self.inner.set(slot, value)
    }

    fn remove(&self, slot: &str) -> Result<(), StorageError> {
        self.check_write()?;
        self.inner.remove(slot)
    }

    fn slots(&self) -> Result<Vec<String>, StorageError> {
        self.check_read()?;
        self.inner.slots()
    }

    fn used_bytes(&self) -> Result<u64, StorageError> {
        self.inner.used_bytes()
    }

    fn name(&self) -> &'static str {
        "faulty"
    }
}
