//! Input limits enforced by the store
//!
//! Violations result in `StoreError::InvalidInput`, except the daily comment
//! limit which has its own `DailyLimitReached` error.

use crate::error::{StoreError, StoreResult};

/// Default number of comments plus replies accepted per article per UTC day
pub const DEFAULT_DAILY_COMMENT_LIMIT: usize = 100;

/// Input limits for record fields
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum comment body length in characters (default: 2000)
    pub max_comment_chars: usize,

    /// Maximum article title length in characters (default: unbounded)
    pub max_title_chars: Option<usize>,

    /// Maximum username length in characters (default: 32)
    pub max_username_chars: usize,

    /// Maximum number of tags on one article (default: unbounded)
    pub max_tags: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_comment_chars: 2000,
            max_title_chars: None,
            max_username_chars: 32,
            max_tags: None,
        }
    }
}

impl Limits {
    /// Validate a comment or reply body
    pub fn validate_comment(&self, content: &str) -> StoreResult<()> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(StoreError::invalid_input("comment cannot be empty"));
        }
        if trimmed.chars().count() > self.max_comment_chars {
            return Err(StoreError::invalid_input(format!(
                "comment exceeds {} characters",
                self.max_comment_chars
            )));
        }
        Ok(())
    }

    /// Validate an article title
    pub fn validate_title(&self, title: &str) -> StoreResult<()> {
        if title.trim().is_empty() {
            return Err(StoreError::invalid_input("article title cannot be empty"));
        }
        match self.max_title_chars {
            Some(max) if title.chars().count() > max => Err(StoreError::invalid_input(
                format!("article title exceeds {} characters", max),
            )),
            _ => Ok(()),
        }
    }

    /// Validate the tag list of an article
    pub fn validate_tags(&self, tags: &[String]) -> StoreResult<()> {
        match self.max_tags {
            Some(max) if tags.len() > max => Err(StoreError::invalid_input(format!(
                "article has {} tags, maximum is {}",
                tags.len(),
                max
            ))),
            _ => Ok(()),
        }
    }

    /// Validate a username
    ///
    /// Usernames are non-empty, at most `max_username_chars` long, and made of
    /// ASCII letters, digits, `_`, `-` and `.`.
    pub fn validate_username(&self, username: &str) -> StoreResult<()> {
        if username.is_empty() {
            return Err(StoreError::invalid_input("username cannot be empty"));
        }
        if username.chars().count() > self.max_username_chars {
            return Err(StoreError::invalid_input(format!(
                "username exceeds {} characters",
                self.max_username_chars
            )));
        }
        if let Some(c) = username
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(StoreError::invalid_input(format!(
                "username contains invalid character '{}'",
                c
            )));
        }
        Ok(())
    }
}

/// Minimal email shape check: one `@` with text on both sides and a dot in the domain
pub fn validate_email(email: &str) -> StoreResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::invalid_input(format!(
            "invalid email address '{}'",
            email
        )))
    }
}
