//! User accounts, membership tiers and watchlists

use crate::types::{PartitionKind, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A registered reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique id
    pub id: String,
    /// Unique handle
    pub username: String,
    /// Contact email
    pub email: String,
    /// Membership tier
    #[serde(default)]
    pub tier: MembershipTier,
    /// Watched article ids, in the order they were added
    ///
    /// Entries may reference deleted articles; they are filtered when read.
    #[serde(default)]
    pub watchlist: Vec<String>,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl User {
    /// True if `article_id` is on the watchlist
    pub fn is_watching(&self, article_id: &str) -> bool {
        self.watchlist.iter().any(|id| id == article_id)
    }

    /// Add or remove `article_id`; returns true if it is now watched
    pub fn toggle_watch(&mut self, article_id: &str) -> bool {
        if self.is_watching(article_id) {
            self.watchlist.retain(|id| id != article_id);
            false
        } else {
            self.watchlist.push(article_id.to_string());
            true
        }
    }
}

impl Record for User {
    const PARTITION: PartitionKind = PartitionKind::Users;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Membership tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    /// Public articles only
    #[default]
    Free,
    /// Full research access
    Premium,
    /// Admin console access, implies premium
    Admin,
}

impl MembershipTier {
    /// True if the tier unlocks premium research
    pub fn is_premium(&self) -> bool {
        matches!(self, MembershipTier::Premium | MembershipTier::Admin)
    }

    /// True if the tier can use the admin console
    pub fn is_admin(&self) -> bool {
        matches!(self, MembershipTier::Admin)
    }

    /// Lowercase name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipTier::Free => "free",
            MembershipTier::Premium => "premium",
            MembershipTier::Admin => "admin",
        }
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(MembershipTier::Free),
            "premium" => Ok(MembershipTier::Premium),
            "admin" => Ok(MembershipTier::Admin),
            other => Err(format!("unknown membership tier '{}'", other)),
        }
    }
}

/// Fields for registering a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub tier: MembershipTier,
}

impl NewUser {
    /// Free-tier user
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        NewUser {
            username: username.into(),
            email: email.into(),
            tier: MembershipTier::Free,
        }
    }

    /// Builder: set tier
    pub fn with_tier(mut self, tier: MembershipTier) -> Self {
        self.tier = tier;
        self
    }
}

/// Partial update for a user; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tier: Option<MembershipTier>,
    #[serde(default)]
    pub watchlist: Option<Vec<String>>,
}

impl UserPatch {
    /// Merge the patch over `user`
    pub fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(tier) = self.tier {
            user.tier = tier;
        }
        if let Some(watchlist) = self.watchlist {
            let mut deduped: Vec<String> = Vec::with_capacity(watchlist.len());
            for id in watchlist {
                if !deduped.contains(&id) {
                    deduped.push(id);
                }
            }
            user.watchlist = deduped;
        }
    }
}
