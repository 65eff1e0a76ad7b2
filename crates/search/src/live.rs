//! Search-as-you-type
//!
//! LiveSearch debounces keystrokes: each call to [`LiveSearch::input`]
//! replaces the pending search, and only the last query typed within the
//! debounce window is run. Results are delivered to a callback on the
//! debounce worker thread.

use crate::debounce::Debouncer;
use crate::relevance::SearchHit;
use crate::request::{SearchFilters, SearchRequest};
use crate::research::ResearchSearch;
use deskdb_core::StoreResult;
use deskdb_engine::Database;
use std::sync::Arc;
use std::time::Duration;

/// Callback receiving the results of a debounced search
pub type ResultSink = Arc<dyn Fn(&str, StoreResult<Vec<SearchHit>>) + Send + Sync>;

/// Debounced research search
pub struct LiveSearch {
    search: ResearchSearch,
    debouncer: Debouncer,
    sink: ResultSink,
}

impl LiveSearch {
    /// Live search using the database's configured debounce window
    ///
    /// # Errors
    ///
    /// Returns an error if the debounce worker cannot be started.
    pub fn new(db: Arc<Database>, sink: ResultSink) -> std::io::Result<Self> {
        let delay = Duration::from_millis(db.config().search.debounce_ms);
        Self::with_delay(db, delay, sink)
    }

    /// Live search with an explicit debounce window
    pub fn with_delay(db: Arc<Database>, delay: Duration, sink: ResultSink) -> std::io::Result<Self> {
        Ok(LiveSearch {
            search: ResearchSearch::new(db),
            debouncer: Debouncer::new(delay)?,
            sink,
        })
    }

    /// Record the current input; the search runs once input goes quiet
    pub fn input(&self, query: &str, filters: SearchFilters) {
        let search = self.search.clone();
        let sink = Arc::clone(&self.sink);
        let request = SearchRequest::new(query).with_filters(filters);
        self.debouncer.schedule(move || {
            let result = search.search(&request);
            sink(&request.query, result);
        });
    }

    /// Abandon the pending search, if any
    pub fn cancel(&self) -> bool {
        self.debouncer.cancel()
    }

    /// Block until the pending search (if any) has run
    pub fn settle(&self) {
        self.debouncer.wait_idle();
    }
}
