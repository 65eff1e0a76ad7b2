//! Search request, filters and limits

use chrono::{DateTime, Duration, Utc};
use deskdb_core::Article;
use deskdb_engine::SearchConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// DateWindow
// ============================================================================

/// Recency window for the date post-filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateWindow {
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Last 90 days
    ThreeMonths,
    /// Last 180 days
    SixMonths,
    /// Last 365 days
    Year,
}

impl DateWindow {
    /// Length of the window
    pub fn duration(&self) -> Duration {
        match self {
            DateWindow::Week => Duration::days(7),
            DateWindow::Month => Duration::days(30),
            DateWindow::ThreeMonths => Duration::days(90),
            DateWindow::SixMonths => Duration::days(180),
            DateWindow::Year => Duration::days(365),
        }
    }

    /// Oldest effective date that passes the filter
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }

    /// Short name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            DateWindow::Week => "1w",
            DateWindow::Month => "1m",
            DateWindow::ThreeMonths => "3m",
            DateWindow::SixMonths => "6m",
            DateWindow::Year => "1y",
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1w" | "week" => Ok(DateWindow::Week),
            "1m" | "month" => Ok(DateWindow::Month),
            "3m" => Ok(DateWindow::ThreeMonths),
            "6m" => Ok(DateWindow::SixMonths),
            "1y" | "year" => Ok(DateWindow::Year),
            other => Err(format!(
                "unknown date window '{}' (expected 1w, 1m, 3m, 6m or 1y)",
                other
            )),
        }
    }
}

// ============================================================================
// SearchFilters
// ============================================================================

/// Optional constraints on which articles a search may return
///
/// Nothing here applies unless `enabled` is set. An empty allowed list
/// leaves that dimension unconstrained. Values are compared ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    /// Master switch
    #[serde(default)]
    pub enabled: bool,
    /// Allowed classifications
    #[serde(default)]
    pub classifications: Vec<String>,
    /// Allowed locations
    #[serde(default)]
    pub locations: Vec<String>,
    /// An article must carry at least one of these tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Drop articles older than this window
    #[serde(default)]
    pub date_range: Option<DateWindow>,
}

impl SearchFilters {
    /// Enabled filters with no constraints yet
    pub fn enabled() -> Self {
        SearchFilters {
            enabled: true,
            ..Default::default()
        }
    }

    /// Builder: allowed classifications
    pub fn with_classifications<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classifications = values.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: allowed locations
    pub fn with_locations<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = values.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: allowed tags
    pub fn with_tags<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = values.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: date window
    pub fn with_date_range(mut self, window: DateWindow) -> Self {
        self.date_range = Some(window);
        self
    }

    /// Pre-filter: true if the article may be scored at all
    pub fn admits(&self, article: &Article) -> bool {
        if !self.enabled {
            return true;
        }
        allowed(&self.classifications, &article.classification)
            && allowed(&self.locations, &article.location)
            && (self.tags.is_empty()
                || article
                    .tags
                    .iter()
                    .any(|tag| self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))))
    }

    /// Post-filter: true if the article is recent enough
    pub fn is_recent(&self, article: &Article, now: DateTime<Utc>) -> bool {
        match (self.enabled, self.date_range) {
            (true, Some(window)) => article.effective_date() >= window.cutoff(now),
            _ => true,
        }
    }
}

fn allowed(set: &[String], value: &str) -> bool {
    set.is_empty() || set.iter().any(|v| v.eq_ignore_ascii_case(value))
}

// ============================================================================
// SearchLimits
// ============================================================================

/// Result caps and the early-termination policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Hard cap on results; scanning stops once reached (default: 20)
    pub max_results: usize,
    /// Relevance counted as high (default: 80)
    pub high_relevance_threshold: u32,
    /// Scanning stops after this many high-relevance hits (default: 10)
    pub max_high_relevance: usize,
    /// Score the whole collection, then keep the best `max_results`
    pub exhaustive: bool,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_results: 20,
            high_relevance_threshold: 80,
            max_high_relevance: 10,
            exhaustive: false,
        }
    }
}

impl From<&SearchConfig> for SearchLimits {
    fn from(config: &SearchConfig) -> Self {
        SearchLimits {
            max_results: config.max_results,
            high_relevance_threshold: config.high_relevance_threshold,
            max_high_relevance: config.max_high_relevance,
            exhaustive: config.exhaustive,
        }
    }
}

// ============================================================================
// SearchRequest
// ============================================================================

/// A search query with its filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,
    /// Filters (inactive unless enabled)
    #[serde(default)]
    pub filters: SearchFilters,
}

impl SearchRequest {
    /// Unfiltered query
    pub fn new(query: impl Into<String>) -> Self {
        SearchRequest {
            query: query.into(),
            filters: SearchFilters::default(),
        }
    }

    /// Builder: set filters
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }
}
