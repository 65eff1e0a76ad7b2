//! Record facades over the Database engine
//!
//! - **ArticleStore**: research articles, slugs and publication workflow
//! - **UserStore**: accounts, membership tiers and watchlists
//! - **CommentStore**: comments with single-level replies and moderation
//! - **NewsletterStore**: newsletter subscriptions
//!
//! ## Design Principle: Stateless Facades
//!
//! Facades hold only an `Arc<Database>` reference. Any number of them may
//! be created on the same Database; all state lives in its partitions.

pub mod articles;
pub mod comments;
pub mod newsletter;
pub mod users;

pub use articles::ArticleStore;
pub use comments::CommentStore;
pub use newsletter::NewsletterStore;
pub use users::UserStore;
