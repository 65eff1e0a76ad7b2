//! Relevance ranking over a stored collection

use crate::common::*;

fn titles(hits: &[SearchHit]) -> Vec<&str> {
    hits.iter().map(|h| h.article.title.as_str()).collect()
}

// ============================================================================
// Exact match
// ============================================================================

#[test]
fn exact_title_match_short_circuits() {
    let t = TestDb::new();
    let articles = t.articles();
    articles.create(published("Aave V3")).unwrap();
    articles.create(published("Aave")).unwrap();
    articles
        .create(published("Lending markets").with_tags(["aave"]))
        .unwrap();

    let hits = t.db.research().query("  AAVE ").unwrap();
    assert_eq!(titles(&hits), vec!["Aave"]);
    assert_eq!(hits[0].relevance, EXACT_MATCH_RELEVANCE);
    assert_eq!(hits[0].matched_fields, vec![MatchedField::Title]);
}

#[test]
fn exact_ticker_match_short_circuits() {
    let t = TestDb::new();
    let articles = t.articles();
    articles.create(published("Universal router")).unwrap();
    articles
        .create(published("Uniswap").with_ticker("UNI"))
        .unwrap();

    let hits = t.db.research().query("uni").unwrap();
    assert_eq!(titles(&hits), vec!["Uniswap"]);
    assert_eq!(hits[0].matched_fields, vec![MatchedField::Ticker]);
}

#[test]
fn several_exact_matches_keep_collection_order() {
    let t = TestDb::new();
    let articles = t.articles();
    articles.create(published("Curve")).unwrap();
    articles.create(published("Other").with_ticker("CURVE")).unwrap();

    let hits = t.db.research().query("curve").unwrap();
    assert_eq!(titles(&hits), vec!["Curve", "Other"]);
    assert!(hits.iter().all(|h| h.relevance == EXACT_MATCH_RELEVANCE));
}

// ============================================================================
// Field weights
// ============================================================================

#[test]
fn field_weights_and_thresholds() {
    let t = TestDb::new();
    let articles = t.articles();
    articles
        .create(published("Staking overview").with_abstract(["Liquid staking at scale"]))
        .unwrap();
    articles.create(published("Lido").with_ticker("STAKINGX")).unwrap();
    articles
        .create(published("Rocket").with_member(TeamMember::new("Staking Sam", "Founder")))
        .unwrap();
    articles
        .create(published("Pools").with_abstract(["Restaking pools explained"]))
        .unwrap();
    articles
        .create(published("Eigen").with_tags(["staking"]))
        .unwrap();
    articles
        .create(
            published("Ops")
                .with_classification("Staking")
                .with_location("Staking Lane"),
        )
        .unwrap();

    let hits = t.db.research().query("staking").unwrap();
    let ranked: Vec<(&str, u32)> = hits
        .iter()
        .map(|h| (h.article.title.as_str(), h.relevance))
        .collect();
    assert_eq!(
        ranked,
        vec![
            // Abstract is skipped once the title scored
            ("Staking overview", 100),
            ("Lido", 80),
            ("Rocket", 60),
            ("Pools", 40),
            ("Ops", 40),
            ("Eigen", 30),
        ]
    );
    let ops = hits.iter().find(|h| h.article.title == "Ops").unwrap();
    assert_eq!(
        ops.matched_fields,
        vec![MatchedField::Classification, MatchedField::Location]
    );
}

#[test]
fn equal_relevance_keeps_collection_order() {
    let t = TestDb::new();
    let articles = t.articles();
    for name in ["Delta vault", "Alpha vault", "Charlie vault", "Bravo vault"] {
        articles.create(published(name)).unwrap();
    }
    let hits = t.db.research().query("vault").unwrap();
    assert_eq!(
        titles(&hits),
        vec!["Delta vault", "Alpha vault", "Charlie vault", "Bravo vault"]
    );
}

#[test]
fn hit_carries_excerpt_of_first_matched_field() {
    let t = TestDb::new();
    t.articles()
        .create(published("Pendle").with_abstract(["Yield Tokenization splits principal"]))
        .unwrap();

    let hits = t.db.research().query("tokenization").unwrap();
    let excerpt = hits[0].excerpt.as_ref().unwrap();
    assert_eq!(excerpt.matched(), "Tokenization");
    assert_eq!(
        excerpt.marked("[", "]"),
        "Yield [Tokenization] splits principal"
    );
}

#[test]
fn non_ascii_matches_carry_an_excerpt() {
    let t = TestDb::new();
    let articles = t.articles();
    articles.create(published("ΟΔΟΣ")).unwrap();
    articles
        .create(published("Athens").with_abstract(["Η ΟΔΟΣ του κεφαλαίου"]))
        .unwrap();

    let hits = t.db.research().query("οδος").unwrap();
    assert_eq!(titles(&hits), vec!["ΟΔΟΣ"]);
    assert_eq!(hits[0].relevance, EXACT_MATCH_RELEVANCE);
    assert_eq!(hits[0].excerpt.as_ref().unwrap().matched(), "ΟΔΟΣ");

    let hits = t.db.research().query("κεφαλαιου").unwrap();
    assert!(hits.is_empty());
    let hits = t.db.research().query("ΤΟΥ ΚΕΦΑΛΑΊΟΥ").unwrap();
    assert_eq!(titles(&hits), vec!["Athens"]);
    assert_eq!(hits[0].relevance, 40);
    assert_eq!(
        hits[0].excerpt.as_ref().unwrap().matched(),
        "του κεφαλαίου"
    );
}

#[test]
fn blank_or_unmatched_query_returns_nothing() {
    let t = TestDb::new();
    t.articles().create(published("Aave")).unwrap();
    assert!(t.db.research().query("   ").unwrap().is_empty());
    assert!(t.db.research().query("zzz").unwrap().is_empty());
}

// ============================================================================
// Early termination
// ============================================================================

#[test]
fn scan_stops_after_ten_high_relevance_hits() {
    let t = TestDb::new();
    let articles = t.articles();
    for n in 1..=15 {
        articles.create(published(&format!("Vault {}", n))).unwrap();
    }

    let hits = t.db.research().query("vault").unwrap();
    assert_eq!(hits.len(), 10);
    assert_eq!(hits[9].article.title, "Vault 10");

    let all = t
        .db
        .research()
        .with_limits(SearchLimits {
            exhaustive: true,
            ..SearchLimits::default()
        })
        .query("vault")
        .unwrap();
    assert_eq!(all.len(), 15);
}

#[test]
fn scan_stops_at_twenty_hits() {
    let t = TestDb::new();
    let articles = t.articles();
    for n in 1..=25 {
        articles
            .create(published(&format!("Note {}", n)).with_tags(["bridge"]))
            .unwrap();
    }
    let hits = t.db.research().query("bridge").unwrap();
    assert_eq!(hits.len(), 20);
    assert!(hits.iter().all(|h| h.relevance == 30));
}

#[test]
fn early_termination_can_miss_better_later_hits() {
    let t = TestDb::new();
    let articles = t.articles();
    for n in 1..=20 {
        articles
            .create(published(&format!("Note {}", n)).with_tags(["oracle"]))
            .unwrap();
    }
    articles.create(published("Oracle design")).unwrap();

    let hits = t.db.research().query("oracle").unwrap();
    assert!(hits.iter().all(|h| h.article.title != "Oracle design"));

    let all = t
        .db
        .research()
        .with_limits(SearchLimits {
            exhaustive: true,
            ..SearchLimits::default()
        })
        .query("oracle")
        .unwrap();
    assert_eq!(all.len(), 20);
    assert_eq!(all[0].article.title, "Oracle design");
}

#[test]
fn configured_limits_are_used() {
    let mut t = TestDb::new();
    std::fs::write(
        t.db_path().join(CONFIG_FILE_NAME),
        "[search]\nmax_results = 3\n",
    )
    .unwrap();
    t.reopen();
    for n in 1..=5 {
        t.articles()
            .create(published(&format!("Note {}", n)).with_tags(["amm"]))
            .unwrap();
    }
    assert_eq!(t.db.research().limits().max_results, 3);
    assert_eq!(t.db.research().query("amm").unwrap().len(), 3);
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn unpublished_articles_are_excluded_unless_asked() {
    let t = TestDb::new();
    let articles = t.articles();
    articles.create(NewArticle::new("Morpho draft")).unwrap();
    articles
        .create(NewArticle::new("Morpho test").with_status(ArticleStatus::Test))
        .unwrap();
    articles.create(published("Morpho live")).unwrap();

    let hits = t.db.research().query("morpho").unwrap();
    assert_eq!(titles(&hits), vec!["Morpho live"]);

    let hits = t
        .db
        .research()
        .including_unpublished()
        .query("morpho")
        .unwrap();
    assert_eq!(hits.len(), 3);
}
