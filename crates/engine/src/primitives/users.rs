//! UserStore: accounts, membership tiers and watchlists
//!
//! Usernames are unique case-insensitively. Emails are indexed for lookup
//! but not required to be unique.

use crate::database::Database;
use crate::partition::{EMAIL, USERNAME};
use deskdb_core::{
    new_id, normalize_email, validate_email, Article, MembershipTier, NewUser, StoreError,
    StoreResult, User, UserPatch,
};
use std::sync::Arc;
use tracing::debug;

/// User partition facade
#[derive(Clone)]
pub struct UserStore {
    db: Arc<Database>,
}

impl UserStore {
    /// Create new UserStore instance
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All users in registration order
    pub fn list(&self) -> StoreResult<Vec<User>> {
        self.db.users.read(self.db.slots(), |p| p.records().to_vec())
    }

    /// Number of users
    pub fn count(&self) -> StoreResult<usize> {
        self.db.users.read(self.db.slots(), |p| p.len())
    }

    /// User by id
    pub fn get(&self, id: &str) -> StoreResult<Option<User>> {
        self.db.users.read(self.db.slots(), |p| p.get(id).cloned())
    }

    /// User by username, ignoring case
    pub fn by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let key = username.to_ascii_lowercase();
        self.db
            .users
            .read(self.db.slots(), |p| p.find_by(USERNAME, &key).cloned())
    }

    /// First user registered with `email`, ignoring case and surrounding space
    pub fn by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let key = normalize_email(email);
        self.db
            .users
            .read(self.db.slots(), |p| p.find_by(EMAIL, &key).cloned())
    }

    /// Register a user
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a malformed username or email
    /// - `AlreadyExists` if the username is taken
    pub fn create(&self, new: NewUser) -> StoreResult<User> {
        let username = new.username.trim().to_string();
        self.db.limits().validate_username(&username)?;
        let email = normalize_email(&new.email);
        validate_email(&email)?;

        let now = self.db.now();
        let user = self.db.users.mutate(self.db.slots(), |p| {
            if p.key_taken(USERNAME, &username.to_ascii_lowercase(), None) {
                return Err(StoreError::AlreadyExists {
                    kind: "username",
                    key: username.clone(),
                });
            }
            let mut id = new_id();
            while p.get(&id).is_some() {
                id = new_id();
            }
            let user = User {
                id,
                username: username.clone(),
                email: email.clone(),
                tier: new.tier,
                watchlist: Vec::new(),
                created_at: now,
            };
            p.push(user.clone());
            Ok(user)
        })?;

        debug!(id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    /// Merge `patch` over the user with `id`
    pub fn update(&self, id: &str, mut patch: UserPatch) -> StoreResult<Option<User>> {
        if let Some(username) = patch.username.as_mut() {
            *username = username.trim().to_string();
            self.db.limits().validate_username(username)?;
        }
        if let Some(email) = patch.email.as_mut() {
            *email = normalize_email(email);
            validate_email(email)?;
        }

        self.db.users.mutate(self.db.slots(), |p| {
            if p.get(id).is_none() {
                return Ok(None);
            }
            if let Some(username) = &patch.username {
                if p.key_taken(USERNAME, &username.to_ascii_lowercase(), Some(id)) {
                    return Err(StoreError::AlreadyExists {
                        kind: "username",
                        key: username.clone(),
                    });
                }
            }
            Ok(p.update(id, |user| {
                patch.apply(user);
                user.clone()
            }))
        })
    }

    /// Change a user's membership tier
    pub fn set_membership(&self, id: &str, tier: MembershipTier) -> StoreResult<Option<User>> {
        self.update(
            id,
            UserPatch {
                tier: Some(tier),
                ..Default::default()
            },
        )
    }

    /// Delete a user; `false` if it did not exist
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        self.db.users.mutate(self.db.slots(), |p| Ok(p.remove(id)))
    }

    /// Add or remove an article on a user's watchlist
    ///
    /// Returns `Some(true)` when the article is now watched, `Some(false)`
    /// when it was removed and `None` if the user does not exist. Stale
    /// entries can always be removed; adding requires the article to exist.
    pub fn toggle_watchlist(&self, user_id: &str, article_id: &str) -> StoreResult<Option<bool>> {
        let article_exists = self
            .db
            .articles
            .read(self.db.slots(), |p| p.get(article_id).is_some())?;

        let toggled = self.db.users.mutate(self.db.slots(), |p| {
            let result = p.update(user_id, |user| {
                if !user.is_watching(article_id) && !article_exists {
                    return Err(StoreError::invalid_input(format!(
                        "unknown article '{}'",
                        article_id
                    )));
                }
                Ok(user.toggle_watch(article_id))
            });
            result.transpose()
        })?;

        if let Some(watched) = toggled {
            debug!(user_id, article_id, watched, "watchlist toggled");
        }
        Ok(toggled)
    }

    /// Watched articles that still exist, in watchlist order
    ///
    /// `None` if the user does not exist.
    pub fn watchlist_articles(&self, user_id: &str) -> StoreResult<Option<Vec<Article>>> {
        let watchlist = match self.get(user_id)? {
            Some(user) => user.watchlist,
            None => return Ok(None),
        };
        self.db.articles.read(self.db.slots(), |p| {
            Some(
                watchlist
                    .iter()
                    .filter_map(|id| p.get(id).cloned())
                    .collect(),
            )
        })
    }
}
