//! Newsletter subscriptions

use crate::types::{PartitionKind, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A newsletter subscription, looked up by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscription {
    /// Unique id
    pub id: String,
    /// Subscriber email, stored lowercase
    pub email: String,
    /// Subscriber name
    #[serde(default)]
    pub name: String,
    /// Where the signup came from ("footer", "article", ...)
    #[serde(default)]
    pub source: String,
    /// Current status
    pub status: SubscriptionStatus,
    /// Time of the latest (re)subscription
    pub subscribed_at: DateTime<Utc>,
    /// Time of the latest unsubscription
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl NewsletterSubscription {
    /// True if mail should be sent
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Subscribed
    }
}

impl Record for NewsletterSubscription {
    const PARTITION: PartitionKind = PartitionKind::Newsletter;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Subscribed,
    Unsubscribed,
}

/// Fields for a signup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: String,
}

impl NewSubscription {
    /// Signup with an email only
    pub fn new(email: impl Into<String>) -> Self {
        NewSubscription {
            email: email.into(),
            name: String::new(),
            source: String::new(),
        }
    }

    /// Builder: set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: set source tag
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Partial update for a subscription
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub status: Option<SubscriptionStatus>,
}

impl SubscriptionPatch {
    /// Merge the patch over `sub`, stamping status change times
    pub fn apply(self, sub: &mut NewsletterSubscription, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            sub.name = name;
        }
        if let Some(source) = self.source {
            sub.source = source;
        }
        if let Some(status) = self.status {
            if status != sub.status {
                match status {
                    SubscriptionStatus::Subscribed => sub.subscribed_at = now,
                    SubscriptionStatus::Unsubscribed => sub.unsubscribed_at = Some(now),
                }
            }
            sub.status = status;
        }
    }
}

/// Canonical form used for email lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
