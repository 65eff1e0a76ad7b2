//! Pre-filters and the date post-filter

use crate::common::*;
use chrono::Duration;

fn search(t: &TestDb, query: &str, filters: SearchFilters) -> Vec<String> {
    t.db.research()
        .search(&SearchRequest::new(query).with_filters(filters))
        .unwrap()
        .into_iter()
        .map(|h| h.article.title)
        .collect()
}

fn seed(t: &TestDb) {
    let articles = t.articles();
    articles
        .create(
            published("Lending Aave")
                .with_classification("Lending")
                .with_location("UK")
                .with_tags(["defi", "credit"]),
        )
        .unwrap();
    articles
        .create(
            published("Lending Maple")
                .with_classification("Credit")
                .with_location("US")
                .with_tags(["institutional"]),
        )
        .unwrap();
    articles
        .create(
            published("Lending Morpho")
                .with_classification("Lending")
                .with_location("France")
                .with_tags(["DeFi"]),
        )
        .unwrap();
}

#[test]
fn classification_filter_ignores_case() {
    let t = TestDb::new();
    seed(&t);
    let filters = SearchFilters::enabled().with_classifications(["lending"]);
    assert_eq!(
        search(&t, "lending", filters),
        vec!["Lending Aave", "Lending Morpho"]
    );
}

#[test]
fn location_and_tag_filters_combine() {
    let t = TestDb::new();
    seed(&t);

    let filters = SearchFilters::enabled().with_locations(["us", "france"]);
    assert_eq!(
        search(&t, "lending", filters),
        vec!["Lending Maple", "Lending Morpho"]
    );

    // Any one matching tag is enough
    let filters = SearchFilters::enabled().with_tags(["defi", "nothing"]);
    assert_eq!(
        search(&t, "lending", filters),
        vec!["Lending Aave", "Lending Morpho"]
    );

    let filters = SearchFilters::enabled()
        .with_tags(["defi"])
        .with_locations(["UK"]);
    assert_eq!(search(&t, "lending", filters), vec!["Lending Aave"]);
}

#[test]
fn disabled_filters_are_ignored() {
    let t = TestDb::new();
    seed(&t);
    let mut filters = SearchFilters::default().with_classifications(["Nothing"]);
    assert!(!filters.enabled);
    assert_eq!(search(&t, "lending", filters.clone()).len(), 3);

    filters.enabled = true;
    assert!(search(&t, "lending", filters).is_empty());
}

#[test]
fn filters_apply_to_exact_matches() {
    let t = TestDb::new();
    t.articles()
        .create(published("Aave").with_classification("Lending"))
        .unwrap();
    t.articles()
        .create(published("Aave governance").with_classification("DAO"))
        .unwrap();

    // The rejected exact match does not short-circuit
    let filters = SearchFilters::enabled().with_classifications(["DAO"]);
    assert_eq!(search(&t, "aave", filters), vec!["Aave governance"]);
}

#[test]
fn rejected_articles_do_not_count_toward_early_termination() {
    let t = TestDb::new();
    let articles = t.articles();
    for n in 1..=12 {
        articles
            .create(published(&format!("Vault {}", n)).with_location("US"))
            .unwrap();
    }
    articles
        .create(published("Vault UK").with_location("UK"))
        .unwrap();

    let filters = SearchFilters::enabled().with_locations(["UK"]);
    assert_eq!(search(&t, "vault", filters), vec!["Vault UK"]);
}

#[test]
fn date_window_drops_old_articles() {
    let t = TestDb::new();
    let articles = t.articles();
    articles.create(published("Bridge history")).unwrap();
    t.clock.advance(Duration::days(45));
    articles.create(published("Bridge today")).unwrap();
    // Drafts fall back to their creation date
    let draft = articles.create(NewArticle::new("Bridge draft")).unwrap();
    assert!(draft.published_at.is_none());

    let filters = SearchFilters::enabled().with_date_range(DateWindow::Month);
    assert_eq!(search(&t, "bridge", filters.clone()), vec!["Bridge today"]);

    let all = t
        .db
        .research()
        .including_unpublished()
        .search(&SearchRequest::new("bridge").with_filters(filters))
        .unwrap();
    assert_eq!(all.len(), 2);

    let filters = SearchFilters::enabled().with_date_range(DateWindow::ThreeMonths);
    assert_eq!(search(&t, "bridge", filters).len(), 2);
}

#[test]
fn date_window_uses_publication_date() {
    let t = TestDb::new();
    let articles = t.articles();
    let old = articles.create(NewArticle::new("Restaking primer")).unwrap();
    t.clock.advance(Duration::days(400));
    articles
        .set_status(&old.id, ArticleStatus::Published)
        .unwrap();

    let filters = SearchFilters::enabled().with_date_range(DateWindow::Week);
    assert_eq!(search(&t, "restaking", filters), vec!["Restaking primer"]);
}

#[test]
fn date_window_applies_after_exact_match() {
    let t = TestDb::new();
    t.articles().create(published("Curve")).unwrap();
    t.clock.advance(Duration::days(10));

    let filters = SearchFilters::enabled().with_date_range(DateWindow::Week);
    assert!(search(&t, "curve", filters).is_empty());
    let filters = SearchFilters::enabled().with_date_range(DateWindow::Month);
    assert_eq!(search(&t, "curve", filters), vec!["Curve"]);
}

#[test]
fn date_window_parses_short_names() {
    for (text, window) in [
        ("1w", DateWindow::Week),
        ("1m", DateWindow::Month),
        ("3m", DateWindow::ThreeMonths),
        ("6m", DateWindow::SixMonths),
        ("1Y", DateWindow::Year),
    ] {
        assert_eq!(text.parse::<DateWindow>().unwrap(), window);
    }
    assert!("2w".parse::<DateWindow>().is_err());
    assert_eq!(DateWindow::SixMonths.duration(), Duration::days(180));
}
