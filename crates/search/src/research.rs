//! Search over the published articles of a Database
//!
//! ResearchSearch is stateless: it holds the Database handle and reads the
//! article partition on every call.

use crate::relevance::{search, SearchHit};
use crate::request::{SearchLimits, SearchRequest};
use deskdb_core::StoreResult;
use deskdb_engine::{ArticleStore, Database};
use std::sync::Arc;
use tracing::debug;

/// Relevance search over published research
#[derive(Clone)]
pub struct ResearchSearch {
    articles: ArticleStore,
    limits: SearchLimits,
    include_unpublished: bool,
}

impl ResearchSearch {
    /// Search with limits from the database configuration
    pub fn new(db: Arc<Database>) -> Self {
        let limits = SearchLimits::from(&db.config().search);
        ResearchSearch {
            articles: ArticleStore::new(db),
            limits,
            include_unpublished: false,
        }
    }

    /// Builder: override limits
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builder: also search drafts and test articles (admin console)
    pub fn including_unpublished(mut self) -> Self {
        self.include_unpublished = true;
        self
    }

    /// Active limits
    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Run a search
    ///
    /// Errors only come from reading the article partition; the ranking
    /// itself never fails.
    pub fn search(&self, request: &SearchRequest) -> StoreResult<Vec<SearchHit>> {
        let articles = if self.include_unpublished {
            self.articles.list()?
        } else {
            self.articles.published()?
        };
        let now = self.articles.database().now();
        let hits = search(&articles, request, &self.limits, now);
        debug!(
            query = %request.query,
            candidates = articles.len(),
            hits = hits.len(),
            "research search"
        );
        Ok(hits)
    }

    /// Unfiltered search for `query`
    pub fn query(&self, query: &str) -> StoreResult<Vec<SearchHit>> {
        self.search(&SearchRequest::new(query))
    }
}
