//! NewsletterStore: subscriptions keyed by email

use crate::database::Database;
use crate::partition::EMAIL;
use deskdb_core::{
    new_id, normalize_email, validate_email, NewSubscription, NewsletterSubscription, StoreResult,
    SubscriptionPatch, SubscriptionStatus,
};
use std::sync::Arc;
use tracing::debug;

/// Newsletter partition facade
#[derive(Clone)]
pub struct NewsletterStore {
    db: Arc<Database>,
}

impl NewsletterStore {
    /// Create new NewsletterStore instance
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All subscriptions in signup order
    pub fn list(&self) -> StoreResult<Vec<NewsletterSubscription>> {
        self.db
            .newsletter
            .read(self.db.slots(), |p| p.records().to_vec())
    }

    /// Subscriptions currently receiving mail
    pub fn active(&self) -> StoreResult<Vec<NewsletterSubscription>> {
        self.db.newsletter.read(self.db.slots(), |p| {
            p.records().iter().filter(|s| s.is_active()).cloned().collect()
        })
    }

    /// Subscription by id
    pub fn get(&self, id: &str) -> StoreResult<Option<NewsletterSubscription>> {
        self.db
            .newsletter
            .read(self.db.slots(), |p| p.get(id).cloned())
    }

    /// Subscription by email, ignoring case and surrounding space
    pub fn by_email(&self, email: &str) -> StoreResult<Option<NewsletterSubscription>> {
        let key = normalize_email(email);
        self.db
            .newsletter
            .read(self.db.slots(), |p| p.find_by(EMAIL, &key).cloned())
    }

    /// Subscribe an email
    ///
    /// An email that already has a subscription is re-activated (and its
    /// name and source refreshed when given) instead of duplicated.
    pub fn subscribe(&self, new: NewSubscription) -> StoreResult<NewsletterSubscription> {
        let email = normalize_email(&new.email);
        validate_email(&email)?;
        let now = self.db.now();

        self.db.newsletter.mutate(self.db.slots(), |p| {
            let patch = SubscriptionPatch {
                name: Some(new.name.trim().to_string()).filter(|n| !n.is_empty()),
                source: Some(new.source.trim().to_string()).filter(|s| !s.is_empty()),
                status: Some(SubscriptionStatus::Subscribed),
            };
            let resubscribed = p.update_by(EMAIL, &email, |sub| {
                patch.apply(sub, now);
                sub.clone()
            });
            if let Some(sub) = resubscribed {
                debug!(email = %email, "newsletter resubscribe");
                return Ok(sub);
            }

            let mut id = new_id();
            while p.get(&id).is_some() {
                id = new_id();
            }
            let sub = NewsletterSubscription {
                id,
                email: email.clone(),
                name: new.name.trim().to_string(),
                source: new.source.trim().to_string(),
                status: SubscriptionStatus::Subscribed,
                subscribed_at: now,
                unsubscribed_at: None,
            };
            p.push(sub.clone());
            debug!(email = %email, "newsletter subscribe");
            Ok(sub)
        })
    }

    /// Unsubscribe an email; `None` if it never subscribed
    pub fn unsubscribe(&self, email: &str) -> StoreResult<Option<NewsletterSubscription>> {
        let key = normalize_email(email);
        let now = self.db.now();
        self.db.newsletter.mutate(self.db.slots(), |p| {
            Ok(p.update_by(EMAIL, &key, |sub| {
                SubscriptionPatch {
                    status: Some(SubscriptionStatus::Unsubscribed),
                    ..Default::default()
                }
                .apply(sub, now);
                sub.clone()
            }))
        })
    }

    /// Merge `patch` over the subscription with `id`
    pub fn update(
        &self,
        id: &str,
        patch: SubscriptionPatch,
    ) -> StoreResult<Option<NewsletterSubscription>> {
        let now = self.db.now();
        self.db.newsletter.mutate(self.db.slots(), |p| {
            Ok(p.update(id, |sub| {
                patch.apply(sub, now);
                sub.clone()
            }))
        })
    }

    /// Delete a subscription; `false` if it did not exist
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        self.db
            .newsletter
            .mutate(self.db.slots(), |p| Ok(p.remove(id)))
    }
}
