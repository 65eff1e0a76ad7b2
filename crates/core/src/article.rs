//! Research article records
//!
//! An article moves through a simple editorial lifecycle
//! (`draft` → `test` → `published`) and carries the fields the relevance
//! search ranks on: title, ticker, team, abstract, tags, classification and
//! location.

use crate::types::{PartitionKind, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Article
// ============================================================================

/// A research article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Unique id
    pub id: String,
    /// Unique URL-safe lookup key
    pub slug: String,
    /// Display title
    pub title: String,
    /// Token ticker (e.g. "UNI")
    #[serde(default)]
    pub ticker: String,
    /// Sector classification (e.g. "DeFi")
    #[serde(default)]
    pub classification: String,
    /// Jurisdiction or region
    #[serde(default)]
    pub location: String,
    /// Tag set, order preserved, no duplicates
    #[serde(default)]
    pub tags: Vec<String>,
    /// Abstract paragraphs, in reading order
    #[serde(default, rename = "abstract")]
    pub abstract_paragraphs: Vec<String>,
    /// Team members, in display order
    #[serde(default)]
    pub team: Vec<TeamMember>,
    /// Editorial status
    pub status: ArticleStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub last_modified: DateTime<Utc>,
    /// First publication time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Body content per reading level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ArticleContent>,
}

impl Article {
    /// Date used for recency filtering: publication time, else creation time
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    /// True if the article is visible to readers
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }

    /// Move the article to `status`, stamping `published_at` on first publication
    pub fn transition(&mut self, status: ArticleStatus, now: DateTime<Utc>) {
        if status == ArticleStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
        self.status = status;
        self.last_modified = now;
    }
}

impl Record for Article {
    const PARTITION: PartitionKind = PartitionKind::Articles;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Editorial status of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// Work in progress, admin only
    #[default]
    Draft,
    /// Staged for review
    Test,
    /// Visible to readers and searchable
    Published,
}

impl ArticleStatus {
    /// Lowercase name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Test => "test",
            ArticleStatus::Published => "published",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(ArticleStatus::Draft),
            "test" => Ok(ArticleStatus::Test),
            "published" => Ok(ArticleStatus::Published),
            other => Err(format!(
                "unknown article status '{}' (expected draft, test or published)",
                other
            )),
        }
    }
}

/// A member of the team behind a project
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    /// Display name
    pub name: String,
    /// Role in the project
    #[serde(default)]
    pub role: String,
    /// Social links
    #[serde(default, skip_serializing_if = "SocialLinks::is_empty")]
    pub socials: SocialLinks,
}

impl TeamMember {
    /// Create a team member without social links
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        TeamMember {
            name: name.into(),
            role: role.into(),
            socials: SocialLinks::default(),
        }
    }
}

/// Optional social profile links
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl SocialLinks {
    /// True if no link is set
    pub fn is_empty(&self) -> bool {
        self.twitter.is_none()
            && self.linkedin.is_none()
            && self.github.is_none()
            && self.website.is_none()
    }
}

// ============================================================================
// Reading levels
// ============================================================================

/// Audience a body variant is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingLevel {
    /// Plain-language overview
    #[default]
    Novice,
    /// Protocol mechanics
    Technical,
    /// Token economics and valuation
    Analyst,
}

impl FromStr for ReadingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "novice" => Ok(ReadingLevel::Novice),
            "technical" => Ok(ReadingLevel::Technical),
            "analyst" => Ok(ReadingLevel::Analyst),
            other => Err(format!("unknown reading level '{}'", other)),
        }
    }
}

/// Article body, one ordered section list per reading level
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArticleContent {
    #[serde(default)]
    pub novice: Vec<ContentSection>,
    #[serde(default)]
    pub technical: Vec<ContentSection>,
    #[serde(default)]
    pub analyst: Vec<ContentSection>,
}

impl ArticleContent {
    /// Sections written for `level`
    pub fn sections(&self, level: ReadingLevel) -> &[ContentSection] {
        match level {
            ReadingLevel::Novice => &self.novice,
            ReadingLevel::Technical => &self.technical,
            ReadingLevel::Analyst => &self.analyst,
        }
    }

    /// Mutable access to the sections for `level`
    pub fn sections_mut(&mut self, level: ReadingLevel) -> &mut Vec<ContentSection> {
        match level {
            ReadingLevel::Novice => &mut self.novice,
            ReadingLevel::Technical => &mut self.technical,
            ReadingLevel::Analyst => &mut self.analyst,
        }
    }
}

/// A titled section of article body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    pub title: String,
    pub body: String,
}

impl ContentSection {
    /// Create a section
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        ContentSection {
            title: title.into(),
            body: body.into(),
        }
    }
}

// ============================================================================
// NewArticle / ArticlePatch
// ============================================================================

/// Fields for creating an article
///
/// The store assigns the id and timestamps. When `slug` is `None` it is
/// derived from the title with [`slugify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_paragraphs: Vec<String>,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub content: Option<ArticleContent>,
}

impl NewArticle {
    /// Start a draft with the given title
    pub fn new(title: impl Into<String>) -> Self {
        NewArticle {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder: set explicit slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Builder: set ticker
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = ticker.into();
        self
    }

    /// Builder: set classification
    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = classification.into();
        self
    }

    /// Builder: set location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder: set tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set abstract paragraphs
    pub fn with_abstract<I, S>(mut self, paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.abstract_paragraphs = paragraphs.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: add a team member
    pub fn with_member(mut self, member: TeamMember) -> Self {
        self.team.push(member);
        self
    }

    /// Builder: set status
    pub fn with_status(mut self, status: ArticleStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder: set content
    pub fn with_content(mut self, content: ArticleContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Materialize the record
    ///
    /// `slug` is the already-resolved unique slug.
    pub fn into_article(self, id: String, slug: String, now: DateTime<Utc>) -> Article {
        let mut article = Article {
            id,
            slug,
            title: self.title.trim().to_string(),
            ticker: self.ticker.trim().to_string(),
            classification: self.classification,
            location: self.location,
            tags: normalize_tags(self.tags),
            abstract_paragraphs: self.abstract_paragraphs,
            team: self.team,
            status: ArticleStatus::Draft,
            created_at: now,
            last_modified: now,
            published_at: None,
            content: self.content,
        };
        article.transition(self.status, now);
        article
    }
}

/// Partial update for an article; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, rename = "abstract")]
    pub abstract_paragraphs: Option<Vec<String>>,
    #[serde(default)]
    pub team: Option<Vec<TeamMember>>,
    #[serde(default)]
    pub status: Option<ArticleStatus>,
    #[serde(default)]
    pub content: Option<ArticleContent>,
}

impl ArticlePatch {
    /// True if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == ArticlePatch::default()
    }

    /// Merge the patch over `article`
    pub fn apply(self, article: &mut Article, now: DateTime<Utc>) {
        if let Some(slug) = self.slug {
            article.slug = slug;
        }
        if let Some(title) = self.title {
            article.title = title.trim().to_string();
        }
        if let Some(ticker) = self.ticker {
            article.ticker = ticker.trim().to_string();
        }
        if let Some(classification) = self.classification {
            article.classification = classification;
        }
        if let Some(location) = self.location {
            article.location = location;
        }
        if let Some(tags) = self.tags {
            article.tags = normalize_tags(tags);
        }
        if let Some(paragraphs) = self.abstract_paragraphs {
            article.abstract_paragraphs = paragraphs;
        }
        if let Some(team) = self.team {
            article.team = team;
        }
        if let Some(content) = self.content {
            article.content = Some(content);
        }
        match self.status {
            Some(status) => article.transition(status, now),
            None => article.last_modified = now,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Derive a URL-safe slug from free text
///
/// Lowercases ASCII alphanumerics and collapses every other run of
/// characters into a single `-`. Returns an empty string when nothing
/// alphanumeric remains.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// True if `slug` is non-empty and only contains `[a-z0-9-]`
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Trim tags, drop empties and duplicates, keep first-seen order
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
