//! Error types for DeskDB
//!
//! This module defines all error types used throughout the store.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Failures are never collapsed into "empty": callers can tell a missing
//! partition (read as empty) apart from a corrupt one ([`StoreError::Corrupt`])
//! and from an unreachable storage medium ([`StoreError::Unavailable`]).

use crate::types::PartitionKind;
use std::io;
use thiserror::Error;

/// Result type alias for DeskDB operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error types for the local store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage medium could not be read or written
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A slot write would exceed the configured storage quota
    #[error("Quota exceeded writing slot '{slot}': {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        /// Slot being written
        slot: String,
        /// Total bytes the medium would hold after the write
        needed: u64,
        /// Configured limit
        limit: u64,
    },

    /// Stored partition data could not be parsed
    #[error("Corrupt partition '{partition}': {reason}")]
    Corrupt {
        /// Partition holding the bad data
        partition: PartitionKind,
        /// Parser message
        reason: String,
    },

    /// Backup text was rejected; the store was left untouched
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    /// Caller supplied an invalid value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A unique key is already taken
    #[error("{kind} already exists: {key}")]
    AlreadyExists {
        /// Record kind ("article slug", "username", ...)
        kind: &'static str,
        /// Conflicting key
        key: String,
    },

    /// The per-article daily comment limit has been reached
    #[error("Daily comment limit of {limit} reached for article {article_id}")]
    DailyLimitReached {
        /// Article receiving the comment
        article_id: String,
        /// Configured limit
        limit: usize,
    },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Build an `InvalidInput` error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        StoreError::InvalidInput(reason.into())
    }

    /// Build a `Corrupt` error for a partition
    pub fn corrupt(partition: PartitionKind, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            partition,
            reason: reason.into(),
        }
    }

    /// True if the stored data for a partition is unreadable
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }

    /// True if the storage medium itself failed (I/O or quota)
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::QuotaExceeded { .. }
        )
    }

    /// Stable machine-readable code, used by the CLI's JSON output
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "Unavailable",
            StoreError::QuotaExceeded { .. } => "QuotaExceeded",
            StoreError::Corrupt { .. } => "Corrupt",
            StoreError::InvalidBackup(_) => "InvalidBackup",
            StoreError::InvalidInput(_) => "InvalidInput",
            StoreError::AlreadyExists { .. } => "AlreadyExists",
            StoreError::DailyLimitReached { .. } => "DailyLimitReached",
            StoreError::Config(_) => "Config",
            StoreError::Serialization(_) => "Serialization",
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
