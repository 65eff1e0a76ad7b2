//! Relevance search for DeskDB
//!
//! This crate provides:
//! - `search`: field-weighted ranking with exact-match short-circuit,
//!   pre-filters, early termination and a date post-filter
//! - SearchRequest / SearchFilters / SearchLimits
//! - Highlight excerpts around the first match
//! - ResearchSearch over a Database's published articles
//! - Debouncer and LiveSearch for search-as-you-type
//! - DatabaseSearchExt extension trait for the `db.research()` accessor
//!
//! # Usage
//!
//! ```ignore
//! use deskdb_search::{DatabaseSearchExt, SearchRequest};
//!
//! let hits = db.research().search(&SearchRequest::new("uniswap"))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod debounce;
pub mod highlight;
pub mod live;
pub mod relevance;
pub mod request;
pub mod research;
pub mod scorer;

use deskdb_engine::Database;
use std::sync::Arc;

// Re-export commonly used types
pub use debounce::Debouncer;
pub use highlight::{eq_ignore_case, find_ignore_case, fold_case, Highlight};
pub use live::{LiveSearch, ResultSink};
pub use relevance::{search, SearchHit};
pub use request::{DateWindow, SearchFilters, SearchLimits, SearchRequest};
pub use research::ResearchSearch;
pub use scorer::{MatchedField, EXACT_MATCH_RELEVANCE};

// ============================================================================
// Database Extension
// ============================================================================

/// Extension trait for Database to provide search functionality
///
/// This trait adds the `.research()` method to `Arc<Database>`.
pub trait DatabaseSearchExt {
    /// Search over published articles with the configured limits
    fn research(&self) -> ResearchSearch;
}

impl DatabaseSearchExt for Arc<Database> {
    fn research(&self) -> ResearchSearch {
        ResearchSearch::new(Arc::clone(self))
    }
}
