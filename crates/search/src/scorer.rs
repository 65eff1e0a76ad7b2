//! Field-weighted relevance scoring
//!
//! Fields are checked in a fixed priority order. Each field category adds
//! its weight at most once, however many of its values match. The lower
//! categories are only consulted while the running score is still small:
//!
//! | Field          | Weight | Checked while score < |
//! |----------------|--------|-----------------------|
//! | title          | 100    | always                |
//! | ticker         | 80     | always                |
//! | team member    | 60     | always                |
//! | abstract       | 40     | 60                    |
//! | tag            | 30     | 40                    |
//! | classification | 20     | 30                    |
//! | location       | 20     | 30                    |

use crate::highlight::{eq_ignore_case, find_ignore_case, Highlight};
use deskdb_core::Article;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relevance given to exact title or ticker matches
pub const EXACT_MATCH_RELEVANCE: u32 = 1000;

/// Article field a query matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    /// Article title
    Title,
    /// Ticker symbol
    Ticker,
    /// A team member's name
    Team,
    /// An abstract paragraph
    Abstract,
    /// A tag
    Tags,
    /// Classification
    Classification,
    /// Location
    Location,
}

impl MatchedField {
    /// Field name as reported to callers
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchedField::Title => "title",
            MatchedField::Ticker => "ticker",
            MatchedField::Team => "team",
            MatchedField::Abstract => "abstract",
            MatchedField::Tags => "tags",
            MatchedField::Classification => "classification",
            MatchedField::Location => "location",
        }
    }
}

impl fmt::Display for MatchedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of scoring one article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scored {
    /// Accumulated relevance
    pub relevance: u32,
    /// Matched categories in check order
    pub matched_fields: Vec<MatchedField>,
    /// Window around the first match
    pub excerpt: Option<Highlight>,
}

fn contains(text: &str, query: &str) -> bool {
    find_ignore_case(text, query).is_some()
}

/// True if the title or ticker equals the query, ignoring case
///
/// `query` must be trimmed and case-folded.
pub fn is_exact_match(article: &Article, query: &str) -> bool {
    eq_ignore_case(&article.title, query)
        || (!article.ticker.is_empty() && eq_ignore_case(&article.ticker, query))
}

/// Excerpt for an exact match
pub fn exact_match(article: &Article, query: &str) -> Scored {
    let (field, text) = if eq_ignore_case(&article.title, query) {
        (MatchedField::Title, article.title.as_str())
    } else {
        (MatchedField::Ticker, article.ticker.as_str())
    };
    Scored {
        relevance: EXACT_MATCH_RELEVANCE,
        matched_fields: vec![field],
        excerpt: Highlight::excerpt(text, query),
    }
}

#[derive(Default)]
struct Tally<'a> {
    relevance: u32,
    matched_fields: Vec<MatchedField>,
    first_text: Option<&'a str>,
}

impl<'a> Tally<'a> {
    fn hit(&mut self, field: MatchedField, weight: u32, text: &'a str) {
        self.relevance += weight;
        self.matched_fields.push(field);
        self.first_text.get_or_insert(text);
    }
}

/// Score an article against a trimmed, case-folded query
///
/// Returns `None` when nothing matched.
pub fn score(article: &Article, query: &str) -> Option<Scored> {
    let mut tally = Tally::default();

    if contains(&article.title, query) {
        tally.hit(MatchedField::Title, 100, &article.title);
    }
    if contains(&article.ticker, query) {
        tally.hit(MatchedField::Ticker, 80, &article.ticker);
    }
    if let Some(member) = article.team.iter().find(|m| contains(&m.name, query)) {
        tally.hit(MatchedField::Team, 60, &member.name);
    }
    if tally.relevance < 60 {
        if let Some(paragraph) = article
            .abstract_paragraphs
            .iter()
            .find(|p| contains(p, query))
        {
            tally.hit(MatchedField::Abstract, 40, paragraph);
        }
    }
    if tally.relevance < 40 {
        if let Some(tag) = article.tags.iter().find(|t| contains(t, query)) {
            tally.hit(MatchedField::Tags, 30, tag);
        }
    }
    if tally.relevance < 30 {
        if contains(&article.classification, query) {
            tally.hit(MatchedField::Classification, 20, &article.classification);
        }
        if contains(&article.location, query) {
            tally.hit(MatchedField::Location, 20, &article.location);
        }
    }

    if tally.relevance == 0 {
        return None;
    }
    Some(Scored {
        relevance: tally.relevance,
        matched_fields: tally.matched_fields,
        excerpt: tally
            .first_text
            .and_then(|text| Highlight::excerpt(text, query)),
    })
}
