//! Core types for DeskDB
//!
//! This crate defines the foundational types used throughout the system:
//! - Record types: Article, User, Comment, NewsletterSubscription
//! - Creation inputs (`New*`) and partial updates (`*Patch`)
//! - SystemMetadata and DatabaseExport (the backup shape)
//! - PartitionKind and the Record trait
//! - StoreError: Error type hierarchy
//! - Limits: input validation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod article;
pub mod comment;
pub mod error;
pub mod limits;
pub mod metadata;
pub mod newsletter;
pub mod types;
pub mod user;

// Re-export commonly used types and traits
pub use article::{
    is_valid_slug, normalize_tags, slugify, Article, ArticleContent, ArticlePatch, ArticleStatus,
    ContentSection, NewArticle, ReadingLevel, SocialLinks, TeamMember,
};
pub use comment::{Comment, CommentAuthor, CommentPatch, NewComment};
pub use error::{StoreError, StoreResult};
pub use limits::{validate_email, Limits, DEFAULT_DAILY_COMMENT_LIMIT};
pub use metadata::{DatabaseExport, SystemMetadata, SCHEMA_VERSION};
pub use newsletter::{
    normalize_email, NewSubscription, NewsletterSubscription, SubscriptionPatch,
    SubscriptionStatus,
};
pub use types::{new_id, PartitionKind, Record};
pub use user::{MembershipTier, NewUser, User, UserPatch};
