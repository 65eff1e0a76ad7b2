//! Write-through persistence across reopen

use crate::common::*;

#[test]
fn records_survive_reopen() {
    let mut t = TestDb::new();
    let a = t.articles().create(published("Aave")).unwrap();
    let u = user(&t.db, "mona");
    t.users().toggle_watchlist(&u.id, &a.id).unwrap();
    let c = t.comments().add(comment_by(&u, &a.id, "hi")).unwrap();
    t.newsletter()
        .subscribe(NewSubscription::new("mona@example.com"))
        .unwrap();

    t.reopen();
    assert_eq!(t.articles().get(&a.id).unwrap(), Some(a.clone()));
    assert_eq!(t.users().get(&u.id).unwrap().unwrap().watchlist, vec![a.id]);
    assert_eq!(t.comments().get(&c.id).unwrap(), Some(c));
    assert_eq!(t.newsletter().active().unwrap().len(), 1);
}

#[test]
fn each_partition_has_its_own_slot_file() {
    let t = TestDb::new();
    t.articles().create(NewArticle::new("Aave")).unwrap();
    user(&t.db, "nina");

    assert!(t.slot_path(PartitionKind::Articles).exists());
    assert!(t.slot_path(PartitionKind::Users).exists());
    // Untouched partitions are absent and read as empty
    assert!(!t.slot_path(PartitionKind::Comments).exists());
    assert!(t.comments().list().unwrap().is_empty());

    let text = std::fs::read_to_string(t.slot_path(PartitionKind::Articles)).unwrap();
    let stored: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(stored[0]["title"], "Aave");
    assert_eq!(stored[0]["status"], "draft");
}

#[test]
fn open_writes_default_config() {
    let t = TestDb::new();
    let text = std::fs::read_to_string(t.db_path().join(CONFIG_FILE_NAME)).unwrap();
    assert!(text.contains("daily_comment_limit = 100"));
    assert_eq!(t.db.config(), &DeskConfig::default());
}

#[test]
fn config_file_is_honored_on_reopen() {
    let mut t = TestDb::new();
    std::fs::write(
        t.db_path().join(CONFIG_FILE_NAME),
        "daily_comment_limit = 1\n\n[search]\nmax_results = 5\n",
    )
    .unwrap();
    t.reopen();
    assert_eq!(t.db.config().daily_comment_limit, 1);
    assert_eq!(t.db.config().search.max_results, 5);
    assert_eq!(t.db.config().search.high_relevance_threshold, 80);
}

#[test]
fn reload_picks_up_writes_from_another_handle() {
    let t = TestDb::new();
    assert_eq!(t.articles().count().unwrap(), 0);

    let other = Database::open(t.db_path()).unwrap();
    ArticleStore::new(other)
        .create(NewArticle::new("Written elsewhere"))
        .unwrap();

    // Cached until reloaded
    assert_eq!(t.articles().count().unwrap(), 0);
    t.db.reload();
    assert_eq!(t.articles().count().unwrap(), 1);
}

#[test]
fn used_bytes_grows_with_records() {
    let t = TestDb::new();
    let empty = t.db.used_bytes().unwrap();
    t.articles()
        .create(NewArticle::new("Aave").with_abstract(["x".repeat(500)]))
        .unwrap();
    assert!(t.db.used_bytes().unwrap() > empty + 500);
}
