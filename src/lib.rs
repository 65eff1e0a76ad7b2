//! DeskDB - local content store and relevance search for research publications
//!
//! DeskDB keeps research articles, users, comments and newsletter
//! subscriptions in named partitions on a local medium, and ranks articles
//! for free-text queries.
//!
//! # Quick Start
//!
//! ```ignore
//! use deskdb::{ArticleStore, Database, DatabaseSearchExt, NewArticle, ArticleStatus};
//!
//! // Create an in-memory database
//! let db = Database::ephemeral();
//!
//! let articles = ArticleStore::new(db.clone());
//! articles.create(NewArticle::new("Uniswap").with_status(ArticleStatus::Published))?;
//!
//! let hits = db.research().query("uniswap")?;
//! ```
//!
//! # Architecture
//!
//! - `deskdb-core`: record types, errors, limits
//! - `deskdb-storage`: the slot medium (memory or files)
//! - `deskdb-engine`: Database handle, partitions, record stores, backup
//! - `deskdb-search`: relevance ranking, filters, debounced live search

pub use deskdb_core::*;
pub use deskdb_engine::{
    ArticleStore, Clock, CommentStore, Database, DatabaseBuilder, DeskConfig, ManualClock,
    NewsletterStore, SearchConfig, SystemClock, UserStore, CONFIG_FILE_NAME,
};
pub use deskdb_search::{
    DatabaseSearchExt, DateWindow, Debouncer, Highlight, LiveSearch, MatchedField, ResearchSearch,
    ResultSink, SearchFilters, SearchHit, SearchLimits, SearchRequest, EXACT_MATCH_RELEVANCE,
};
pub use deskdb_storage::{FileSlots, MemorySlots, Quota, SlotStore, StorageError};

/// Fault-injecting slot store for tests
pub mod testing {
    pub use deskdb_storage::testing::FaultySlots;
}
