//! Typed failures: corrupt partitions, unavailable medium, quota

use crate::common::*;

#[test]
fn corrupt_partition_is_reported_not_emptied() {
    let mut t = TestDb::new();
    t.articles().create(NewArticle::new("Aave")).unwrap();
    user(&t.db, "olga");
    std::fs::write(t.slot_path(PartitionKind::Articles), "[{\"id\": ").unwrap();
    t.reopen();

    let err = t.articles().list().unwrap_err();
    assert!(err.is_corrupt());
    assert!(matches!(
        err,
        StoreError::Corrupt {
            partition: PartitionKind::Articles,
            ..
        }
    ));
    // Writes refuse to overwrite what they cannot read
    assert!(t.articles().create(NewArticle::new("Curve")).is_err());
    // Other partitions are unaffected
    assert_eq!(t.users().count().unwrap(), 1);
    // So is anything that needs every partition
    assert!(t.db.export().unwrap_err().is_corrupt());
    assert!(t.db.backup().is_err());
}

#[test]
fn reset_partition_recovers_after_corruption() {
    let mut t = TestDb::new();
    user(&t.db, "pia");
    std::fs::write(t.slot_path(PartitionKind::Users), "not json").unwrap();
    t.reopen();
    assert!(t.users().list().unwrap_err().is_corrupt());

    t.db.reset_partition(PartitionKind::Users).unwrap();
    assert!(t.users().list().unwrap().is_empty());
    user(&t.db, "pia");

    t.reopen();
    assert_eq!(t.users().count().unwrap(), 1);
}

#[test]
fn corrupt_metadata_is_reported() {
    let mut t = TestDb::new();
    t.db.backup().unwrap();
    std::fs::write(t.slot_path(PartitionKind::System), "{").unwrap();
    t.reopen();

    assert!(t.db.system_metadata().unwrap_err().is_corrupt());
    t.db.reset_partition(PartitionKind::System).unwrap();
    assert!(t.db.system_metadata().unwrap().last_backup.is_none());
}

#[test]
fn failed_write_keeps_previous_state() {
    let (db, slots) = faulty_db();
    let articles = ArticleStore::new(db.clone());
    articles.create(NewArticle::new("Aave")).unwrap();

    slots.fail_writes_after(0);
    let err = articles.create(NewArticle::new("Curve")).unwrap_err();
    assert!(err.is_unavailable());
    assert_eq!(articles.count().unwrap(), 1);
    assert!(articles.by_slug("curve").unwrap().is_none());

    slots.heal();
    articles.create(NewArticle::new("Curve")).unwrap();
    assert_eq!(articles.count().unwrap(), 2);
}

#[test]
fn unreadable_medium_is_unavailable() {
    let (db, slots) = faulty_db();
    slots.fail_reads();
    let err = UserStore::new(db.clone()).list().unwrap_err();
    assert!(err.is_unavailable());
    assert_eq!(err.code(), "Unavailable");

    slots.heal();
    assert!(UserStore::new(db).list().unwrap().is_empty());
}

#[test]
fn restore_rolls_back_partial_write() {
    let (db, slots) = faulty_db();
    ArticleStore::new(db.clone())
        .create(NewArticle::new("Aave"))
        .unwrap();
    let before = db.export().unwrap();

    let source = create_test_db();
    ArticleStore::new(source.clone())
        .create(NewArticle::new("Other"))
        .unwrap();
    UserStore::new(source.clone())
        .create(NewUser::new("quinn", "quinn@example.com"))
        .unwrap();
    let text = source.backup().unwrap();

    // Three slots land, the fourth write fails, the rollback writes succeed
    slots.fail_one_write_after(3);
    assert!(db.restore_from_backup(&text).unwrap_err().is_unavailable());

    db.reload();
    let after = db.export().unwrap();
    assert_eq!(after.articles, before.articles);
    assert!(after.users.is_empty());
}

#[test]
fn quota_exceeded_is_typed() {
    let db = Database::builder().quota_bytes(4096).open().unwrap();
    let articles = ArticleStore::new(db.clone());

    let err = articles
        .create(NewArticle::new("Big").with_abstract(["x".repeat(8192)]))
        .unwrap_err();
    assert!(matches!(err, StoreError::QuotaExceeded { limit: 4096, .. }));
    assert!(err.is_unavailable());
    assert_eq!(articles.count().unwrap(), 0);

    articles.create(NewArticle::new("Small")).unwrap();
}
