//! System metadata block and the whole-store export shape

use crate::article::Article;
use crate::comment::Comment;
use crate::newsletter::NewsletterSubscription;
use crate::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current persisted schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Aggregate counts and bookkeeping, persisted in the `system` slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetadata {
    #[serde(default)]
    pub total_articles: usize,
    #[serde(default)]
    pub total_users: usize,
    /// Top-level comments plus replies
    #[serde(default)]
    pub total_comments: usize,
    /// Published research articles
    #[serde(default)]
    pub total_protocols: usize,
    /// Schema version the data was written with
    #[serde(default = "default_version")]
    pub version: u32,
    /// Time of the last successful backup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<DateTime<Utc>>,
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for SystemMetadata {
    fn default() -> Self {
        SystemMetadata {
            total_articles: 0,
            total_users: 0,
            total_comments: 0,
            total_protocols: 0,
            version: SCHEMA_VERSION,
            last_backup: None,
        }
    }
}

/// Snapshot of every partition plus metadata
///
/// This is the backup format: serialized as pretty JSON by
/// `Database::backup` and parsed back by `Database::restore_from_backup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseExport {
    /// Schema version of the export
    pub version: u32,
    pub metadata: SystemMetadata,
    pub articles: Vec<Article>,
    pub users: Vec<User>,
    pub comments: Vec<Comment>,
    pub newsletter: Vec<NewsletterSubscription>,
}

impl DatabaseExport {
    /// Counts derived from the exported partitions
    pub fn derived_counts(&self) -> (usize, usize, usize, usize) {
        let comments = self.comments.iter().map(|c| 1 + c.replies.len()).sum();
        let protocols = self.articles.iter().filter(|a| a.is_published()).count();
        (self.articles.len(), self.users.len(), comments, protocols)
    }
}
