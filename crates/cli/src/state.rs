//! Session wrapper around an open database.
//!
//! Holds the `Arc<Database>` plus one handle per record store; all of them
//! share the same underlying database.

use std::sync::Arc;

use deskdb_core::{CommentAuthor, NewComment, StoreError, StoreResult};
use deskdb_engine::{ArticleStore, CommentStore, Database, NewsletterStore, UserStore};
use deskdb_search::{DatabaseSearchExt, SearchLimits};

use crate::format::{Output, Stats};
use crate::parse::Action;

/// Wraps the database and its record stores.
pub struct SessionState {
    db: Arc<Database>,
    articles: ArticleStore,
    users: UserStore,
    comments: CommentStore,
    newsletter: NewsletterStore,
}

fn maybe<T>(value: Option<T>, wrap: impl FnOnce(T) -> Output) -> Output {
    value.map(wrap).unwrap_or(Output::Nil)
}

impl SessionState {
    /// Create a new SessionState over a database handle.
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            articles: ArticleStore::new(Arc::clone(&db)),
            users: UserStore::new(Arc::clone(&db)),
            comments: CommentStore::new(Arc::clone(&db)),
            newsletter: NewsletterStore::new(Arc::clone(&db)),
            db,
        }
    }

    /// Execute one action.
    pub fn execute(&self, action: Action) -> StoreResult<Output> {
        match action {
            // Articles
            Action::ArticleList { status: None } => Ok(Output::Articles(self.articles.list()?)),
            Action::ArticleList {
                status: Some(status),
            } => Ok(Output::Articles(self.articles.with_status(status)?)),
            Action::ArticleGet { key } => {
                let found = match self.articles.get(&key)? {
                    Some(article) => Some(article),
                    None => self.articles.by_slug(&key)?,
                };
                Ok(maybe(found, |a| Output::Article(Box::new(a))))
            }
            Action::ArticleCreate(new) => {
                Ok(Output::Article(Box::new(self.articles.create(*new)?)))
            }
            Action::ArticleUpdate { id, patch } => Ok(maybe(
                self.articles.update(&id, *patch)?,
                |a| Output::Article(Box::new(a)),
            )),
            Action::ArticleStatus { id, status } => Ok(maybe(
                self.articles.set_status(&id, status)?,
                |a| Output::Article(Box::new(a)),
            )),
            Action::ArticleDelete { id } => Ok(Output::Bool(self.articles.delete(&id)?)),

            // Users
            Action::UserList => Ok(Output::Users(self.users.list()?)),
            Action::UserGet { key } => {
                let found = match self.users.get(&key)? {
                    Some(user) => Some(user),
                    None => self.users.by_username(&key)?,
                };
                Ok(maybe(found, Output::User))
            }
            Action::UserCreate(new) => Ok(Output::User(self.users.create(new)?)),
            Action::UserTier { id, tier } => {
                Ok(maybe(self.users.set_membership(&id, tier)?, Output::User))
            }
            Action::UserWatch {
                user_id,
                article_id,
            } => Ok(maybe(
                self.users.toggle_watchlist(&user_id, &article_id)?,
                Output::Bool,
            )),
            Action::UserWatchlist { user_id } => Ok(maybe(
                self.users.watchlist_articles(&user_id)?,
                Output::Articles,
            )),
            Action::UserDelete { id } => Ok(Output::Bool(self.users.delete(&id)?)),

            // Comments
            Action::CommentList {
                article_id: Some(article_id),
                include_hidden,
            } => Ok(Output::Comments(
                self.comments.for_article(&article_id, include_hidden)?,
            )),
            Action::CommentList {
                article_id: None, ..
            } => Ok(Output::Comments(self.comments.list()?)),
            Action::CommentFlagged => Ok(Output::Comments(self.comments.flagged()?)),
            Action::CommentAdd {
                article_id,
                user_id,
                content,
            } => {
                let new = NewComment::new(article_id, self.author(&user_id)?, content);
                Ok(Output::Comment(Box::new(self.comments.add(new)?)))
            }
            Action::CommentReply {
                parent_id,
                user_id,
                content,
            } => {
                let Some(parent) = self.comments.get(&parent_id)? else {
                    return Ok(Output::Nil);
                };
                let new = NewComment::new(parent.article_id, self.author(&user_id)?, content);
                Ok(maybe(self.comments.reply(&parent_id, new)?, |c| {
                    Output::Comment(Box::new(c))
                }))
            }
            Action::CommentHide { id, hidden } => Ok(maybe(
                self.comments.set_hidden(&id, hidden)?,
                |c| Output::Comment(Box::new(c)),
            )),
            Action::CommentFlag { id, flagged } => Ok(maybe(
                self.comments.set_flagged(&id, flagged)?,
                |c| Output::Comment(Box::new(c)),
            )),
            Action::CommentDelete { id } => Ok(Output::Bool(self.comments.delete(&id)?)),

            // Newsletter
            Action::NewsletterList { active_only: false } => {
                Ok(Output::Subscriptions(self.newsletter.list()?))
            }
            Action::NewsletterList { active_only: true } => {
                Ok(Output::Subscriptions(self.newsletter.active()?))
            }
            Action::NewsletterSubscribe(new) => {
                Ok(Output::Subscription(self.newsletter.subscribe(new)?))
            }
            Action::NewsletterUnsubscribe { email } => Ok(maybe(
                self.newsletter.unsubscribe(&email)?,
                Output::Subscription,
            )),
            Action::NewsletterDelete { id } => Ok(Output::Bool(self.newsletter.delete(&id)?)),

            // Search
            Action::Search {
                request,
                include_unpublished,
                exhaustive,
            } => {
                let mut research = self.db.research();
                if include_unpublished {
                    research = research.including_unpublished();
                }
                if exhaustive {
                    let limits = SearchLimits {
                        exhaustive: true,
                        ..*research.limits()
                    };
                    research = research.with_limits(limits);
                }
                Ok(Output::Hits(research.search(&request)?))
            }

            // Maintenance
            Action::Stats => Ok(Output::Stats(Stats {
                metadata: self.db.system_metadata()?,
                used_bytes: self.db.used_bytes()?,
            })),
            Action::Export => Ok(Output::Export(Box::new(self.db.export()?))),
            Action::Backup { out: None } => Ok(Output::Text(self.db.backup()?)),
            Action::Backup { out: Some(path) } => {
                let text = self
                    .db
                    .backup_with(|text| std::fs::write(&path, text).map_err(StoreError::from))?;
                Ok(Output::Written {
                    path: path.display().to_string(),
                    bytes: text.len(),
                })
            }
            Action::Restore { text } => {
                self.db.restore_from_backup(&text)?;
                Ok(Output::Unit)
            }
            Action::Clear => {
                self.db.clear()?;
                Ok(Output::Unit)
            }
            Action::Reset { partition } => {
                self.db.reset_partition(partition)?;
                Ok(Output::Unit)
            }
        }
    }

    /// Author fields for a comment posted as `user_id`.
    fn author(&self, user_id: &str) -> StoreResult<CommentAuthor> {
        let user = self
            .users
            .get(user_id)?
            .ok_or_else(|| StoreError::invalid_input(format!("no user with id {}", user_id)))?;
        Ok(CommentAuthor::new(user.id, user.username))
    }
}
