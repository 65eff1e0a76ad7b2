//! Storage layer for DeskDB
//!
//! This crate implements the persistent medium the store writes through to:
//! - SlotStore: synchronous named-slot text storage trait
//! - MemorySlots: in-memory slots for ephemeral databases
//! - FileSlots: one JSON file per slot, atomic replace via rename
//! - Quota: optional byte budget across all slots
//! - testing: fault injection wrapper for engine tests
//!
//! The medium knows nothing about records; the engine serializes each
//! partition to text and rewrites its slot on every mutation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;
pub mod memory;
pub mod slots;
pub mod testing;

pub use file::FileSlots;
pub use memory::MemorySlots;
pub use slots::{validate_slot_name, Quota, SlotStore, StorageError};
