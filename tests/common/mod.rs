//! Shared test utilities for all integration test suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
pub use deskdb::testing::FaultySlots;
pub use deskdb::*;
use tempfile::TempDir;

// ============================================================================
// TestDb - file-backed test database wrapper
// ============================================================================

/// Test database in a temporary directory, with a pinned clock.
pub struct TestDb {
    pub db: Arc<Database>,
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
}

impl TestDb {
    /// Create a new file-backed test database.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let clock = Arc::new(ManualClock::new(fixed_now()));
        let db = open_at(dir.path(), &clock);
        TestDb { db, dir, clock }
    }

    pub fn articles(&self) -> ArticleStore {
        ArticleStore::new(self.db.clone())
    }

    pub fn users(&self) -> UserStore {
        UserStore::new(self.db.clone())
    }

    pub fn comments(&self) -> CommentStore {
        CommentStore::new(self.db.clone())
    }

    pub fn newsletter(&self) -> NewsletterStore {
        NewsletterStore::new(self.db.clone())
    }

    pub fn db_path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a partition's slot file.
    pub fn slot_path(&self, kind: PartitionKind) -> PathBuf {
        self.dir.path().join(format!("{}.json", kind.slot_name()))
    }

    /// Reopen the database from the same directory (simulates restart).
    pub fn reopen(&mut self) {
        self.db = open_at(self.dir.path(), &self.clock);
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

fn open_at(path: &Path, clock: &Arc<ManualClock>) -> Arc<Database> {
    Database::builder()
        .path(path)
        .clock(clock.clone())
        .open()
        .expect("Failed to open test database")
}

// ============================================================================
// Fixtures
// ============================================================================

/// Noon UTC on a fixed day, far from midnight.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Create an in-memory test database.
pub fn create_test_db() -> Arc<Database> {
    Database::ephemeral()
}

/// In-memory database over a fault-injecting slot store.
pub fn faulty_db() -> (Arc<Database>, Arc<FaultySlots<MemorySlots>>) {
    let slots = Arc::new(FaultySlots::new(MemorySlots::new()));
    let db = Database::builder()
        .slots(slots.clone())
        .open()
        .expect("Failed to open faulty database");
    (db, slots)
}

/// A published article with the given title.
pub fn published(title: &str) -> NewArticle {
    NewArticle::new(title).with_status(ArticleStatus::Published)
}

/// Create a user and return it.
pub fn user(db: &Arc<Database>, name: &str) -> User {
    UserStore::new(db.clone())
        .create(NewUser::new(name, format!("{}@example.com", name)))
        .expect("create user")
}

/// Comment fields posted by `user` on `article_id`.
pub fn comment_by(user: &User, article_id: &str, content: &str) -> NewComment {
    NewComment::new(
        article_id,
        CommentAuthor::new(user.id.clone(), user.username.clone()),
        content,
    )
}
