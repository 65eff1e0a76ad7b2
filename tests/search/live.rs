//! Debounced search-as-you-type

use crate::common::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

type Seen = Arc<Mutex<Vec<(String, Vec<String>)>>>;

fn recording_sink() -> (ResultSink, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let sink: ResultSink = Arc::new(move |query: &str, result: StoreResult<Vec<SearchHit>>| {
        let titles = result
            .map(|hits| hits.into_iter().map(|h| h.article.title).collect())
            .unwrap_or_default();
        sink_seen.lock().push((query.to_string(), titles));
    });
    (sink, seen)
}

fn live(t: &TestDb, sink: ResultSink) -> LiveSearch {
    LiveSearch::with_delay(t.db.clone(), Duration::from_millis(40), sink).unwrap()
}

#[test]
fn only_the_last_keystroke_is_searched() {
    let t = TestDb::new();
    t.articles().create(published("Balancer")).unwrap();
    t.articles().create(published("Bancor")).unwrap();
    let (sink, seen) = recording_sink();
    let live = live(&t, sink);

    for prefix in ["b", "ba", "bal", "bala"] {
        live.input(prefix, SearchFilters::default());
    }
    live.settle();

    assert_eq!(
        *seen.lock(),
        vec![("bala".to_string(), vec!["Balancer".to_string()])]
    );
}

#[test]
fn search_sees_writes_made_before_it_runs() {
    let t = TestDb::new();
    let (sink, seen) = recording_sink();
    let live = LiveSearch::with_delay(t.db.clone(), Duration::from_millis(200), sink).unwrap();

    live.input("frax", SearchFilters::default());
    t.articles().create(published("Frax")).unwrap();
    live.settle();

    assert_eq!(seen.lock()[0].1, vec!["Frax".to_string()]);
}

#[test]
fn cancel_drops_pending_search() {
    let t = TestDb::new();
    let (sink, seen) = recording_sink();
    let live = live(&t, sink);

    live.input("aave", SearchFilters::default());
    assert!(live.cancel());
    assert!(!live.cancel());
    live.settle();
    assert!(seen.lock().is_empty());

    // Still usable after a cancel
    live.input("aave", SearchFilters::default());
    live.settle();
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn filters_travel_with_the_input() {
    let t = TestDb::new();
    t.articles()
        .create(published("Pool A").with_location("UK"))
        .unwrap();
    t.articles()
        .create(published("Pool B").with_location("US"))
        .unwrap();
    let (sink, seen) = recording_sink();
    let live = live(&t, sink);

    live.input("pool", SearchFilters::enabled().with_locations(["us"]));
    live.settle();
    assert_eq!(seen.lock()[0].1, vec!["Pool B".to_string()]);
}

#[test]
fn separate_bursts_each_run_once() {
    let t = TestDb::new();
    t.articles().create(published("Lido")).unwrap();
    let (sink, seen) = recording_sink();
    let live = live(&t, sink);

    live.input("l", SearchFilters::default());
    live.input("li", SearchFilters::default());
    live.settle();
    live.input("lid", SearchFilters::default());
    live.input("lido", SearchFilters::default());
    live.settle();

    let queries: Vec<String> = seen.lock().iter().map(|(q, _)| q.clone()).collect();
    assert_eq!(queries, vec!["li".to_string(), "lido".to_string()]);
}

#[test]
fn configured_debounce_window_is_used() {
    let mut t = TestDb::new();
    std::fs::write(
        t.db_path().join(CONFIG_FILE_NAME),
        "[search]\ndebounce_ms = 5\n",
    )
    .unwrap();
    t.reopen();
    assert_eq!(t.db.config().search.debounce_ms, 5);

    let (sink, seen) = recording_sink();
    let live = LiveSearch::new(t.db.clone(), sink).unwrap();
    live.input("x", SearchFilters::default());
    live.settle();
    assert_eq!(seen.lock().len(), 1);
}
