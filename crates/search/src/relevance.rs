//! Relevance-ranked article search
//!
//! # Flow
//!
//! 1. Blank query: no results
//! 2. Exact title/ticker match anywhere: only those, at relevance 1000
//! 3. Otherwise one scan in collection order, skipping articles the
//!    filters reject, stopping early once enough hits are in hand
//! 4. Stable sort by descending relevance
//! 5. Date post-filter, then the result cap
//!
//! Early termination means a large collection can yield the best hits
//! among those scanned rather than the global top results. Set
//! `SearchLimits::exhaustive` to score everything first.

use crate::highlight::{fold_case, Highlight};
use crate::request::{SearchLimits, SearchRequest};
use crate::scorer::{self, MatchedField, Scored};
use chrono::{DateTime, Utc};
use deskdb_core::Article;
use serde::Serialize;
use tracing::trace;

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// The matching article
    pub article: Article,
    /// Relevance score
    pub relevance: u32,
    /// Field categories that matched, in check order
    pub matched_fields: Vec<MatchedField>,
    /// Excerpt of the first matched field
    pub excerpt: Option<Highlight>,
}

impl SearchHit {
    fn new(article: &Article, scored: Scored) -> Self {
        SearchHit {
            article: article.clone(),
            relevance: scored.relevance,
            matched_fields: scored.matched_fields,
            excerpt: scored.excerpt,
        }
    }
}

/// Search `articles` in their given order
pub fn search(
    articles: &[Article],
    request: &SearchRequest,
    limits: &SearchLimits,
    now: DateTime<Utc>,
) -> Vec<SearchHit> {
    let query = fold_case(request.query.trim());
    if query.is_empty() {
        return Vec::new();
    }
    let filters = &request.filters;

    let exact: Vec<SearchHit> = articles
        .iter()
        .filter(|a| scorer::is_exact_match(a, &query))
        .filter(|a| filters.admits(a))
        .map(|a| SearchHit::new(a, scorer::exact_match(a, &query)))
        .collect();
    if !exact.is_empty() {
        trace!(query = %query, hits = exact.len(), "exact match");
        return finish(exact, request, limits, now);
    }

    let mut hits = Vec::new();
    let mut high = 0usize;
    let mut scanned = 0usize;
    for article in articles.iter().filter(|a| filters.admits(a)) {
        scanned += 1;
        let Some(scored) = scorer::score(article, &query) else {
            continue;
        };
        if scored.relevance >= limits.high_relevance_threshold {
            high += 1;
        }
        hits.push(SearchHit::new(article, scored));

        if !limits.exhaustive
            && (high >= limits.max_high_relevance || hits.len() >= limits.max_results)
        {
            break;
        }
    }
    trace!(query = %query, scanned, hits = hits.len(), "scored articles");

    hits.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    finish(hits, request, limits, now)
}

fn finish(
    mut hits: Vec<SearchHit>,
    request: &SearchRequest,
    limits: &SearchLimits,
    now: DateTime<Utc>,
) -> Vec<SearchHit> {
    hits.retain(|hit| request.filters.is_recent(&hit.article, now));
    hits.truncate(limits.max_results);
    hits
}
