//! Export, backup, restore and clear

use crate::common::*;
use chrono::Duration;

fn populate(t: &TestDb) {
    let articles = t.articles();
    let a = articles
        .create(published("Aave").with_tags(["lending"]))
        .unwrap();
    articles.create(NewArticle::new("Draft notes")).unwrap();
    let u = user(&t.db, "lena");
    let c = t.comments().add(comment_by(&u, &a.id, "nice")).unwrap();
    t.comments()
        .reply(&c.id, comment_by(&u, &a.id, "thanks"))
        .unwrap();
    t.newsletter()
        .subscribe(NewSubscription::new("lena@example.com"))
        .unwrap();
}

#[test]
fn export_recomputes_counts_without_writing() {
    let t = TestDb::new();
    populate(&t);

    let export = t.db.export().unwrap();
    assert_eq!(export.version, SCHEMA_VERSION);
    assert_eq!(export.articles.len(), 2);
    assert_eq!(export.metadata.total_articles, 2);
    assert_eq!(export.metadata.total_protocols, 1);
    assert_eq!(export.metadata.total_comments, 2);
    assert_eq!(export.metadata.total_users, 1);
    assert!(export.metadata.last_backup.is_none());
    assert!(t.db.system_metadata().unwrap().last_backup.is_none());
}

#[test]
fn backup_records_time_and_restores_identically() {
    let t = TestDb::new();
    populate(&t);

    let before = t.db.export().unwrap();
    let text = t.db.backup().unwrap();
    assert_eq!(
        t.db.system_metadata().unwrap().last_backup,
        Some(fixed_now())
    );

    t.db.clear().unwrap();
    assert_eq!(t.articles().count().unwrap(), 0);

    t.db.restore_from_backup(&text).unwrap();
    let after = t.db.export().unwrap();
    assert_eq!(after.articles, before.articles);
    assert_eq!(after.users, before.users);
    assert_eq!(after.comments, before.comments);
    assert_eq!(after.newsletter, before.newsletter);

    // Indices are rebuilt from the restored records
    assert!(t.articles().by_slug("aave").unwrap().is_some());
    assert!(t.users().by_username("lena").unwrap().is_some());
}

#[test]
fn restore_survives_reopen() {
    let mut t = TestDb::new();
    populate(&t);
    let text = t.db.backup().unwrap();
    t.db.clear().unwrap();
    t.db.restore_from_backup(&text).unwrap();

    t.reopen();
    assert_eq!(t.articles().count().unwrap(), 2);
    assert_eq!(t.comments().count().unwrap(), 2);
    assert_eq!(t.newsletter().list().unwrap().len(), 1);
}

#[test]
fn malformed_backup_leaves_store_untouched() {
    let t = TestDb::new();
    populate(&t);
    let before = t.db.export().unwrap();

    for text in ["", "not json", "{\"version\": 1}", "[1, 2, 3]"] {
        let err = t.db.restore_from_backup(text).unwrap_err();
        assert!(matches!(err, StoreError::InvalidBackup(_)), "{:?}", text);
    }
    assert_eq!(t.db.export().unwrap(), before);
}

#[test]
fn restore_accepts_hand_written_backup() {
    let t = TestDb::new();
    let text = r#"{
        "version": 1,
        "metadata": {},
        "articles": [{
            "id": "a1",
            "slug": "curve",
            "title": "Curve",
            "status": "published",
            "createdAt": "2024-01-01T00:00:00Z",
            "lastModified": "2024-01-01T00:00:00Z"
        }],
        "users": [],
        "comments": [],
        "newsletter": []
    }"#;
    t.db.restore_from_backup(text).unwrap();

    let a = t.articles().by_slug("curve").unwrap().unwrap();
    assert_eq!(a.id, "a1");
    assert!(a.tags.is_empty());
    assert_eq!(t.db.system_metadata().unwrap().total_protocols, 1);
}

#[test]
fn clear_resets_everything() {
    let t = TestDb::new();
    populate(&t);
    t.db.backup().unwrap();

    t.db.clear().unwrap();
    let meta = t.db.system_metadata().unwrap();
    assert_eq!(meta.total_articles, 0);
    assert_eq!(meta.total_comments, 0);
    assert!(meta.last_backup.is_none());
    assert!(t.users().list().unwrap().is_empty());
    assert!(t.newsletter().list().unwrap().is_empty());

    // Slug and username are free again
    t.articles().create(NewArticle::new("Aave")).unwrap();
    user(&t.db, "lena");
}

#[test]
fn second_backup_carries_first_backup_time() {
    let t = TestDb::new();
    populate(&t);
    t.db.backup().unwrap();
    let first = fixed_now();

    t.clock.advance(Duration::hours(2));
    let text = t.db.backup().unwrap();
    let parsed: DatabaseExport = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.metadata.last_backup, Some(first));
    assert_eq!(
        t.db.system_metadata().unwrap().last_backup,
        Some(first + Duration::hours(2))
    );
}
