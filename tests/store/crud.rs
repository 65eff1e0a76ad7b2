//! Record CRUD through the store facades
//!
//! Covers unique keys, partial updates, status transitions and the
//! aggregate counts reported by system metadata.

use crate::common::*;

// ============================================================================
// Articles
// ============================================================================

#[test]
fn article_create_get_by_id_and_slug() {
    let t = TestDb::new();
    let articles = t.articles();

    let created = articles
        .create(NewArticle::new("Uniswap V4").with_ticker("UNI"))
        .unwrap();
    assert_eq!(created.slug, "uniswap-v4");
    assert_eq!(created.status, ArticleStatus::Draft);
    assert_eq!(created.created_at, fixed_now());

    assert_eq!(articles.get(&created.id).unwrap(), Some(created.clone()));
    assert_eq!(articles.by_slug("uniswap-v4").unwrap(), Some(created));
    assert_eq!(articles.get("missing").unwrap(), None);
}

#[test]
fn derived_slugs_are_suffixed_explicit_slugs_conflict() {
    let t = TestDb::new();
    let articles = t.articles();

    articles.create(NewArticle::new("Aave")).unwrap();
    let second = articles.create(NewArticle::new("Aave")).unwrap();
    let third = articles.create(NewArticle::new("AAVE")).unwrap();
    assert_eq!(second.slug, "aave-2");
    assert_eq!(third.slug, "aave-3");

    let err = articles
        .create(NewArticle::new("Other").with_slug("aave"))
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
    assert_eq!(articles.count().unwrap(), 3);
}

#[test]
fn article_update_merges_only_given_fields() {
    let t = TestDb::new();
    let articles = t.articles();
    let a = articles
        .create(
            NewArticle::new("Curve")
                .with_ticker("CRV")
                .with_tags(["dex", "stableswap"]),
        )
        .unwrap();

    t.clock.advance(chrono::Duration::hours(1));
    let updated = articles
        .update(
            &a.id,
            ArticlePatch {
                title: Some("Curve Finance".into()),
                ..ArticlePatch::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Curve Finance");
    assert_eq!(updated.ticker, "CRV");
    assert_eq!(updated.tags, a.tags);
    assert_eq!(updated.slug, a.slug);
    assert!(updated.last_modified > a.last_modified);

    assert_eq!(
        articles.update("missing", ArticlePatch::default()).unwrap(),
        None
    );
}

#[test]
fn article_slug_update_checks_uniqueness() {
    let t = TestDb::new();
    let articles = t.articles();
    let a = articles.create(NewArticle::new("Aave")).unwrap();
    articles.create(NewArticle::new("Compound")).unwrap();

    let patch = ArticlePatch {
        slug: Some("compound".into()),
        ..ArticlePatch::default()
    };
    assert!(articles.update(&a.id, patch).is_err());

    // Keeping its own slug is not a conflict
    let patch = ArticlePatch {
        slug: Some("aave".into()),
        ..ArticlePatch::default()
    };
    assert!(articles.update(&a.id, patch).unwrap().is_some());
}

#[test]
fn publishing_stamps_published_at_once() {
    let t = TestDb::new();
    let articles = t.articles();
    let a = articles.create(NewArticle::new("Maker")).unwrap();
    assert!(a.published_at.is_none());

    let published = articles
        .set_status(&a.id, ArticleStatus::Published)
        .unwrap()
        .unwrap();
    let first = published.published_at.unwrap();
    assert_eq!(articles.published().unwrap().len(), 1);

    t.clock.advance(chrono::Duration::days(1));
    articles.set_status(&a.id, ArticleStatus::Test).unwrap();
    let again = articles
        .set_status(&a.id, ArticleStatus::Published)
        .unwrap()
        .unwrap();
    assert_eq!(again.published_at, Some(first));
}

#[test]
fn invalid_article_input_is_rejected() {
    let t = TestDb::new();
    let articles = t.articles();

    assert!(matches!(
        articles.create(NewArticle::new("   ")),
        Err(StoreError::InvalidInput(_))
    ));
    assert!(matches!(
        articles.create(NewArticle::new("Ok").with_slug("Not A Slug")),
        Err(StoreError::InvalidInput(_))
    ));
    assert_eq!(articles.count().unwrap(), 0);
}

#[test]
fn titles_without_ascii_letters_get_an_id_slug() {
    let t = TestDb::new();
    let articles = t.articles();

    let first = articles.create(NewArticle::new("以太坊")).unwrap();
    assert_eq!(first.slug, format!("article-{}", &first.id[..8]));
    assert!(is_valid_slug(&first.slug));
    assert_eq!(
        articles.by_slug(&first.slug).unwrap().map(|a| a.id),
        Some(first.id.clone())
    );

    let second = articles.create(NewArticle::new("!!!")).unwrap();
    assert!(second.slug.starts_with("article-"));
    assert_ne!(second.slug, first.slug);
}

#[test]
fn long_titles_and_many_tags_are_accepted() {
    let t = TestDb::new();
    let articles = t.articles();

    let long = articles.create(NewArticle::new("x".repeat(201))).unwrap();
    assert_eq!(long.title.chars().count(), 201);

    let tags: Vec<String> = (0..40).map(|n| format!("tag{}", n)).collect();
    let tagged = articles
        .create(NewArticle::new("Tagged").with_tags(tags.clone()))
        .unwrap();
    assert_eq!(tagged.tags, tags);

    let patched = articles
        .update(
            &tagged.id,
            ArticlePatch {
                title: Some("y".repeat(300)),
                ..ArticlePatch::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(patched.title.len(), 300);
}

#[test]
fn article_delete() {
    let t = TestDb::new();
    let articles = t.articles();
    let a = articles.create(NewArticle::new("Lido")).unwrap();

    assert!(articles.delete(&a.id).unwrap());
    assert!(!articles.delete(&a.id).unwrap());
    assert!(articles.by_slug("lido").unwrap().is_none());
}

// ============================================================================
// Users
// ============================================================================

#[test]
fn usernames_are_unique_ignoring_case() {
    let t = TestDb::new();
    let users = t.users();

    let alice = users.create(NewUser::new("Alice", "Alice@Example.com")).unwrap();
    assert_eq!(alice.email, "alice@example.com");
    assert_eq!(alice.tier, MembershipTier::Free);

    let err = users
        .create(NewUser::new("alice", "other@example.com"))
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { kind: "username", .. }));

    assert_eq!(users.by_username("ALICE").unwrap().map(|u| u.id), Some(alice.id.clone()));
    assert_eq!(
        users.by_email("alice@example.com").unwrap().map(|u| u.id),
        Some(alice.id)
    );
}

#[test]
fn membership_tier_change() {
    let t = TestDb::new();
    let users = t.users();
    let bob = users.create(NewUser::new("bob", "bob@example.com")).unwrap();

    let upgraded = users
        .set_membership(&bob.id, MembershipTier::Premium)
        .unwrap()
        .unwrap();
    assert!(upgraded.tier.is_premium());
    assert!(!upgraded.tier.is_admin());
    assert!(users
        .set_membership("missing", MembershipTier::Admin)
        .unwrap()
        .is_none());
}

#[test]
fn watchlist_toggle_and_stale_entries() {
    let t = TestDb::new();
    let users = t.users();
    let articles = t.articles();
    let carol = users.create(NewUser::new("carol", "carol@example.com")).unwrap();
    let a = articles.create(NewArticle::new("Aave")).unwrap();
    let b = articles.create(NewArticle::new("Balancer")).unwrap();

    assert_eq!(users.toggle_watchlist(&carol.id, &a.id).unwrap(), Some(true));
    assert_eq!(users.toggle_watchlist(&carol.id, &b.id).unwrap(), Some(true));
    assert!(users.toggle_watchlist(&carol.id, "missing").is_err());
    assert_eq!(users.toggle_watchlist("nobody", &a.id).unwrap(), None);

    articles.delete(&a.id).unwrap();
    let watched = users.watchlist_articles(&carol.id).unwrap().unwrap();
    assert_eq!(watched.len(), 1);
    assert_eq!(watched[0].id, b.id);

    // A stale entry can still be removed
    assert_eq!(users.toggle_watchlist(&carol.id, &a.id).unwrap(), Some(false));
    assert_eq!(users.get(&carol.id).unwrap().unwrap().watchlist, vec![b.id]);
}

// ============================================================================
// Newsletter
// ============================================================================

#[test]
fn newsletter_resubscribe_reuses_record() {
    let t = TestDb::new();
    let newsletter = t.newsletter();

    let first = newsletter
        .subscribe(NewSubscription::new("Reader@Example.com").with_source("footer"))
        .unwrap();
    assert!(first.is_active());

    let off = newsletter.unsubscribe("reader@example.com").unwrap().unwrap();
    assert!(!off.is_active());
    assert!(off.unsubscribed_at.is_some());
    assert!(newsletter.active().unwrap().is_empty());

    let again = newsletter
        .subscribe(NewSubscription::new("reader@example.com"))
        .unwrap();
    assert_eq!(again.id, first.id);
    assert!(again.is_active());
    assert_eq!(again.source, "footer");
    assert_eq!(newsletter.list().unwrap().len(), 1);

    assert!(newsletter.unsubscribe("never@example.com").unwrap().is_none());
}

#[test]
fn newsletter_rejects_bad_email() {
    let t = TestDb::new();
    assert!(matches!(
        t.newsletter().subscribe(NewSubscription::new("not-an-email")),
        Err(StoreError::InvalidInput(_))
    ));
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn system_metadata_counts_are_live() {
    let t = TestDb::new();
    let articles = t.articles();
    let a = articles.create(published("Aave")).unwrap();
    articles.create(NewArticle::new("Draft")).unwrap();
    let u = user(&t.db, "dave");
    let c = t.comments().add(comment_by(&u, &a.id, "first")).unwrap();
    t.comments()
        .reply(&c.id, comment_by(&u, &a.id, "second"))
        .unwrap();

    let meta = t.db.system_metadata().unwrap();
    assert_eq!(meta.total_articles, 2);
    assert_eq!(meta.total_protocols, 1);
    assert_eq!(meta.total_users, 1);
    assert_eq!(meta.total_comments, 2);
    assert_eq!(meta.version, SCHEMA_VERSION);
    assert!(meta.last_backup.is_none());
}
