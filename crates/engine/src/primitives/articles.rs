//! ArticleStore: research articles and their publication workflow
//!
//! ## Design
//!
//! ArticleStore is a stateless facade over the Database engine. It holds no
//! in-memory state beyond an `Arc<Database>` reference.
//!
//! ## Slugs
//!
//! Every article has a unique slug. An explicit slug must be well formed
//! and unused; a slug derived from the title gets a numeric suffix
//! (`aave-2`, `aave-3`, ...) when the plain form is taken.
//!
//! ## Workflow
//!
//! Status moves between draft, test and published in one write.
//! `publishedAt` is stamped the first time an article is published.

use crate::database::Database;
use crate::partition::{Partition, SLUG};
use deskdb_core::{
    is_valid_slug, new_id, slugify, Article, ArticlePatch, ArticleStatus, NewArticle, StoreError,
    StoreResult,
};
use std::sync::Arc;
use tracing::debug;

/// Article partition facade
///
/// # Example
///
/// ```ignore
/// let articles = ArticleStore::new(db.clone());
/// let aave = articles.create(NewArticle::new("Aave").with_ticker("AAVE"))?;
/// articles.set_status(&aave.id, ArticleStatus::Published)?;
/// ```
#[derive(Clone)]
pub struct ArticleStore {
    db: Arc<Database>,
}

impl ArticleStore {
    /// Create new ArticleStore instance
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    // ========== Reads ==========

    /// All articles in insertion order
    pub fn list(&self) -> StoreResult<Vec<Article>> {
        self.db
            .articles
            .read(self.db.slots(), |p| p.records().to_vec())
    }

    /// Number of articles
    pub fn count(&self) -> StoreResult<usize> {
        self.db.articles.read(self.db.slots(), |p| p.len())
    }

    /// Article by id
    pub fn get(&self, id: &str) -> StoreResult<Option<Article>> {
        self.db
            .articles
            .read(self.db.slots(), |p| p.get(id).cloned())
    }

    /// Article by slug
    pub fn by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
        self.db
            .articles
            .read(self.db.slots(), |p| p.find_by(SLUG, slug).cloned())
    }

    /// Articles with the given status, in insertion order
    pub fn with_status(&self, status: ArticleStatus) -> StoreResult<Vec<Article>> {
        self.db.articles.read(self.db.slots(), |p| {
            p.records()
                .iter()
                .filter(|a| a.status == status)
                .cloned()
                .collect()
        })
    }

    /// Published articles, in insertion order
    pub fn published(&self) -> StoreResult<Vec<Article>> {
        self.with_status(ArticleStatus::Published)
    }

    // ========== Writes ==========

    /// Create an article
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty title, a malformed explicit slug, or a
    ///   title or tag list over an opt-in `Limits` cap
    /// - `AlreadyExists` if an explicit slug is taken
    pub fn create(&self, new: NewArticle) -> StoreResult<Article> {
        let limits = self.db.limits();
        limits.validate_title(&new.title)?;
        limits.validate_tags(&new.tags)?;
        if let Some(slug) = &new.slug {
            check_slug(slug)?;
        }

        let now = self.db.now();
        let article = self.db.articles.mutate(self.db.slots(), |p| {
            let mut id = new_id();
            while p.get(&id).is_some() {
                id = new_id();
            }
            let slug = match &new.slug {
                Some(slug) if p.key_taken(SLUG, slug, None) => {
                    return Err(StoreError::AlreadyExists {
                        kind: "article slug",
                        key: slug.clone(),
                    })
                }
                Some(slug) => slug.clone(),
                None => derive_slug(p, &new.title, &id),
            };
            let article = new.into_article(id, slug, now);
            p.push(article.clone());
            Ok(article)
        })?;

        debug!(id = %article.id, slug = %article.slug, "article created");
        Ok(article)
    }

    /// Merge `patch` over the article with `id`
    ///
    /// Returns `None` if no article has that id.
    pub fn update(&self, id: &str, patch: ArticlePatch) -> StoreResult<Option<Article>> {
        let limits = self.db.limits();
        if let Some(title) = &patch.title {
            limits.validate_title(title)?;
        }
        if let Some(tags) = &patch.tags {
            limits.validate_tags(tags)?;
        }
        if let Some(slug) = &patch.slug {
            check_slug(slug)?;
        }

        let now = self.db.now();
        self.db.articles.mutate(self.db.slots(), |p| {
            if p.get(id).is_none() {
                return Ok(None);
            }
            if let Some(slug) = &patch.slug {
                if p.key_taken(SLUG, slug, Some(id)) {
                    return Err(StoreError::AlreadyExists {
                        kind: "article slug",
                        key: slug.clone(),
                    });
                }
            }
            Ok(p.update(id, |article| {
                patch.apply(article, now);
                article.clone()
            }))
        })
    }

    /// Move an article to `status`
    pub fn set_status(&self, id: &str, status: ArticleStatus) -> StoreResult<Option<Article>> {
        let now = self.db.now();
        self.db.articles.mutate(self.db.slots(), |p| {
            Ok(p.update(id, |article| {
                article.transition(status, now);
                article.clone()
            }))
        })
    }

    /// Delete an article; `false` if it did not exist
    ///
    /// Comments and watchlist entries referencing the article are left in
    /// place; readers filter stale references.
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        self.db
            .articles
            .mutate(self.db.slots(), |p| Ok(p.remove(id)))
    }
}

fn check_slug(slug: &str) -> StoreResult<()> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(StoreError::invalid_input(format!(
            "slug '{}' must be lowercase letters, digits and inner dashes",
            slug
        )))
    }
}

/// Slug from the title, or from the id when the title has no ASCII
/// letters or digits; `-2`, `-3`, ... is appended until unused
fn derive_slug(p: &Partition<Article>, title: &str, id: &str) -> String {
    let mut base = slugify(title);
    if base.is_empty() {
        let short: String = id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(8)
            .collect::<String>()
            .to_ascii_lowercase();
        base = format!("article-{}", short);
    }
    if !p.key_taken(SLUG, &base, None) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !p.key_taken(SLUG, &candidate, None) {
            return candidate;
        }
        n += 1;
    }
}
