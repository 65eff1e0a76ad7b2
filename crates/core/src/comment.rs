//! Comments with single-level threaded replies
//!
//! A reply is not a top-level record: it is embedded in its parent's
//! `replies` list. Only top-level comments may receive replies.

use crate::types::{PartitionKind, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reader comment on an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique id (unique across comments and replies)
    pub id: String,
    /// Article the comment belongs to
    pub article_id: String,
    /// Denormalized article slug
    pub article_slug: String,
    /// Denormalized article title
    pub article_title: String,
    /// Author display fields
    pub author: CommentAuthor,
    /// Body text
    pub content: String,
    /// Posting time
    pub timestamp: DateTime<Utc>,
    /// Hidden by a moderator
    #[serde(default)]
    pub hidden: bool,
    /// Flagged for moderator review
    #[serde(default)]
    pub flagged: bool,
    /// Parent comment id, set on replies only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Embedded replies, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
}

impl Comment {
    /// True for replies
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// This comment followed by its replies
    pub fn thread(&self) -> impl Iterator<Item = &Comment> {
        std::iter::once(self).chain(self.replies.iter())
    }

    /// Find this comment or one of its replies by id
    pub fn find(&self, id: &str) -> Option<&Comment> {
        self.thread().find(|c| c.id == id)
    }

    /// Mutable variant of [`Comment::find`]
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Comment> {
        if self.id == id {
            return Some(self);
        }
        self.replies.iter_mut().find(|c| c.id == id)
    }

    /// Copy with hidden replies removed
    pub fn without_hidden_replies(&self) -> Comment {
        let mut visible = self.clone();
        visible.replies.retain(|r| !r.hidden);
        visible
    }
}

impl Record for Comment {
    const PARTITION: PartitionKind = PartitionKind::Comments;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Display fields of a comment author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub user_id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl CommentAuthor {
    /// Author without an avatar
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        CommentAuthor {
            user_id: user_id.into(),
            username: username.into(),
            avatar: None,
        }
    }
}

/// Fields for posting a comment or reply
///
/// Article slug and title are copied from the article record by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub article_id: String,
    pub author: CommentAuthor,
    pub content: String,
}

impl NewComment {
    /// Create comment fields
    pub fn new(
        article_id: impl Into<String>,
        author: CommentAuthor,
        content: impl Into<String>,
    ) -> Self {
        NewComment {
            article_id: article_id.into(),
            author,
            content: content.into(),
        }
    }
}

/// Partial update for a comment or reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPatch {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub hidden: Option<bool>,
    #[serde(default)]
    pub flagged: Option<bool>,
}

impl CommentPatch {
    /// Merge the patch over `comment` (replies are not touched)
    pub fn apply(self, comment: &mut Comment) {
        if let Some(content) = self.content {
            comment.content = content.trim().to_string();
        }
        if let Some(hidden) = self.hidden {
            comment.hidden = hidden;
        }
        if let Some(flagged) = self.flagged {
            comment.flagged = flagged;
        }
    }
}
