//! Identifiers and partition naming
//!
//! Every record carries a string id (a hyphenated UUID v4). Records live in
//! one of five named partitions, each persisted in its own storage slot.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate a fresh record id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Named collection within the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKind {
    /// Research articles
    Articles,
    /// Registered users
    Users,
    /// Comments and their embedded replies
    Comments,
    /// Newsletter subscriptions
    Newsletter,
    /// System metadata block
    System,
}

impl PartitionKind {
    /// All partitions, in the order they are exported and restored
    pub const ALL: [PartitionKind; 5] = [
        PartitionKind::Articles,
        PartitionKind::Users,
        PartitionKind::Comments,
        PartitionKind::Newsletter,
        PartitionKind::System,
    ];

    /// Storage slot name for this partition
    pub fn slot_name(&self) -> &'static str {
        match self {
            PartitionKind::Articles => "articles",
            PartitionKind::Users => "users",
            PartitionKind::Comments => "comments",
            PartitionKind::Newsletter => "newsletter",
            PartitionKind::System => "system",
        }
    }
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot_name())
    }
}

impl FromStr for PartitionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartitionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.slot_name() == s)
            .ok_or_else(|| format!("unknown partition '{}'", s))
    }
}

/// A record stored in one of the list partitions
///
/// Implemented by every entity the store persists as an ordered sequence.
/// The engine uses `id()` to maintain its id index.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Partition this record type lives in
    const PARTITION: PartitionKind;

    /// Unique id of this record
    fn id(&self) -> &str;
}
