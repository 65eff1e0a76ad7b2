//! CommentStore: article comments with single-level replies
//!
//! Replies live inside their parent's `replies` list; the partition index
//! maps every reply id to its parent so replies are addressable by id like
//! top-level comments. Replying to a reply is rejected.
//!
//! Each article accepts at most `daily_comment_limit` comments plus replies
//! per UTC day (see `deskdb.toml`).

use crate::database::Database;
use crate::partition::{Partition, REPLY};
use chrono::{DateTime, Utc};
use deskdb_core::{
    new_id, Comment, CommentPatch, NewComment, StoreError, StoreResult,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Comment partition facade
#[derive(Clone)]
pub struct CommentStore {
    db: Arc<Database>,
}

impl CommentStore {
    /// Create new CommentStore instance
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All top-level comments (with replies) in posting order
    pub fn list(&self) -> StoreResult<Vec<Comment>> {
        self.db
            .comments
            .read(self.db.slots(), |p| p.records().to_vec())
    }

    /// Comments plus replies
    pub fn count(&self) -> StoreResult<usize> {
        self.db.comments.read(self.db.slots(), |p| {
            p.records().iter().map(|c| 1 + c.replies.len()).sum()
        })
    }

    /// Comment or reply by id
    pub fn get(&self, id: &str) -> StoreResult<Option<Comment>> {
        self.db.comments.read(self.db.slots(), |p| {
            p.get(id)
                .cloned()
                .or_else(|| p.find_by(REPLY, id).and_then(|c| c.find(id)).cloned())
        })
    }

    /// Top-level comments on an article in posting order
    ///
    /// Without `include_hidden`, hidden comments and hidden replies are
    /// left out.
    pub fn for_article(&self, article_id: &str, include_hidden: bool) -> StoreResult<Vec<Comment>> {
        self.db.comments.read(self.db.slots(), |p| {
            p.records()
                .iter()
                .filter(|c| c.article_id == article_id)
                .filter(|c| include_hidden || !c.hidden)
                .map(|c| {
                    if include_hidden {
                        c.clone()
                    } else {
                        c.without_hidden_replies()
                    }
                })
                .collect()
        })
    }

    /// Comments plus replies posted on an article during the current UTC day
    pub fn count_today(&self, article_id: &str) -> StoreResult<usize> {
        let now = self.db.now();
        self.db
            .comments
            .read(self.db.slots(), |p| posted_on_day(p, article_id, now))
    }

    /// Comments and replies flagged for review, flattened
    pub fn flagged(&self) -> StoreResult<Vec<Comment>> {
        self.db.comments.read(self.db.slots(), |p| {
            p.records()
                .iter()
                .flat_map(|c| c.thread())
                .filter(|c| c.flagged)
                .map(|c| {
                    let mut flat = c.clone();
                    flat.replies.clear();
                    flat
                })
                .collect()
        })
    }

    /// Post a top-level comment
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty or oversized body or an unknown article
    /// - `DailyLimitReached` once the article hit its daily limit
    pub fn add(&self, new: NewComment) -> StoreResult<Comment> {
        self.db.limits().validate_comment(&new.content)?;
        let (slug, title) = self.article_names(&new.article_id)?;
        let now = self.db.now();
        let limit = self.db.config().daily_comment_limit;

        let comment = self.db.comments.mutate(self.db.slots(), |p| {
            check_daily_limit(p, &new.article_id, now, limit)?;
            let comment = Comment {
                id: fresh_id(p),
                article_id: new.article_id.clone(),
                article_slug: slug,
                article_title: title,
                author: new.author.clone(),
                content: new.content.trim().to_string(),
                timestamp: now,
                hidden: false,
                flagged: false,
                parent_id: None,
                replies: Vec::new(),
            };
            p.push(comment.clone());
            Ok(comment)
        })?;

        debug!(id = %comment.id, article_id = %comment.article_id, "comment added");
        Ok(comment)
    }

    /// Reply to a top-level comment
    ///
    /// Returns `None` if `parent_id` matches no comment.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `parent_id` is itself a reply or the reply names
    ///   a different article than its parent
    /// - `DailyLimitReached` once the article hit its daily limit
    pub fn reply(&self, parent_id: &str, new: NewComment) -> StoreResult<Option<Comment>> {
        self.db.limits().validate_comment(&new.content)?;
        let now = self.db.now();
        let limit = self.db.config().daily_comment_limit;

        let reply = self.db.comments.mutate(self.db.slots(), |p| {
            if p.find_by(REPLY, parent_id).is_some() {
                return Err(StoreError::invalid_input(
                    "replies can only be added to top-level comments",
                ));
            }
            let parent = match p.get(parent_id) {
                Some(parent) => parent,
                None => return Ok(None),
            };
            if parent.article_id != new.article_id {
                return Err(StoreError::invalid_input(format!(
                    "reply targets article '{}' but its parent belongs to '{}'",
                    new.article_id, parent.article_id
                )));
            }
            check_daily_limit(p, &new.article_id, now, limit)?;

            let id = fresh_id(p);
            let reply = p.update(parent_id, |parent| {
                let reply = Comment {
                    id,
                    article_id: parent.article_id.clone(),
                    article_slug: parent.article_slug.clone(),
                    article_title: parent.article_title.clone(),
                    author: new.author.clone(),
                    content: new.content.trim().to_string(),
                    timestamp: now,
                    hidden: false,
                    flagged: false,
                    parent_id: Some(parent.id.clone()),
                    replies: Vec::new(),
                };
                parent.replies.push(reply.clone());
                reply
            });
            Ok(reply)
        })?;

        if let Some(reply) = &reply {
            debug!(id = %reply.id, parent_id, "reply added");
        }
        Ok(reply)
    }

    /// Merge `patch` over a comment or reply
    pub fn update(&self, id: &str, patch: CommentPatch) -> StoreResult<Option<Comment>> {
        if let Some(content) = &patch.content {
            self.db.limits().validate_comment(content)?;
        }
        self.db.comments.mutate(self.db.slots(), |p| {
            if p.get(id).is_some() {
                return Ok(p.update(id, |c| {
                    patch.apply(c);
                    c.clone()
                }));
            }
            Ok(p
                .update_by(REPLY, id, |parent| {
                    parent.find_mut(id).map(|reply| {
                        patch.apply(reply);
                        reply.clone()
                    })
                })
                .flatten())
        })
    }

    /// Hide or unhide a comment or reply
    pub fn set_hidden(&self, id: &str, hidden: bool) -> StoreResult<Option<Comment>> {
        let updated = self.update(
            id,
            CommentPatch {
                hidden: Some(hidden),
                ..Default::default()
            },
        )?;
        if updated.is_some() {
            info!(id, hidden, "comment visibility changed");
        }
        Ok(updated)
    }

    /// Flag or unflag a comment or reply for review
    pub fn set_flagged(&self, id: &str, flagged: bool) -> StoreResult<Option<Comment>> {
        self.update(
            id,
            CommentPatch {
                flagged: Some(flagged),
                ..Default::default()
            },
        )
    }

    /// Delete a comment (with its replies) or a single reply
    ///
    /// Returns `false` if nothing matched.
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        self.db.comments.mutate(self.db.slots(), |p| {
            if p.remove(id) {
                return Ok(true);
            }
            Ok(p
                .update_by(REPLY, id, |parent| {
                    parent.replies.retain(|r| r.id != id);
                })
                .is_some())
        })
    }

    fn article_names(&self, article_id: &str) -> StoreResult<(String, String)> {
        self.db
            .articles
            .read(self.db.slots(), |p| {
                p.get(article_id)
                    .map(|a| (a.slug.clone(), a.title.clone()))
            })?
            .ok_or_else(|| StoreError::invalid_input(format!("unknown article '{}'", article_id)))
    }
}

fn fresh_id(p: &Partition<Comment>) -> String {
    let mut id = new_id();
    while p.get(&id).is_some() || p.find_by(REPLY, &id).is_some() {
        id = new_id();
    }
    id
}

fn posted_on_day(p: &Partition<Comment>, article_id: &str, now: DateTime<Utc>) -> usize {
    let today = now.date_naive();
    p.records()
        .iter()
        .filter(|c| c.article_id == article_id)
        .flat_map(|c| c.thread())
        .filter(|c| c.timestamp.date_naive() == today)
        .count()
}

fn check_daily_limit(
    p: &Partition<Comment>,
    article_id: &str,
    now: DateTime<Utc>,
    limit: usize,
) -> StoreResult<()> {
    if posted_on_day(p, article_id, now) >= limit {
        return Err(StoreError::DailyLimitReached {
            article_id: article_id.to_string(),
            limit,
        });
    }
    Ok(())
}
