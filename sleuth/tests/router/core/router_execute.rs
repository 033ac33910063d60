use sleuth::{Operation, Outcome, RequestOptions};

use crate::helpers::{builder, cache_dir, scraper, searcher};

#[tokio::test]
async fn execute_dispatches_on_operation() {
    let dir = cache_dir();
    let s = searcher("s");
    let p = scraper("p");
    let sleuth = builder(&dir, &["s", "p"])
        .with_connector(s.clone())
        .with_connector(p.clone())
        .build()
        .unwrap();
    let opts = RequestOptions::new();

    let found = sleuth.execute(Operation::Search, "query", &opts).await;
    assert_eq!(found.operation(), Operation::Search);
    assert!(found.is_success());
    assert!(found.error().is_none());
    assert_eq!(found.attempts().len(), 1);

    let page = sleuth
        .execute(Operation::Scrape, "https://example.com", &opts)
        .await;
    assert_eq!(page.operation(), Operation::Scrape);
    assert!(page.is_success());
    match page {
        Outcome::Scrape(r) => assert_eq!(r.response.url, "https://example.com"),
        Outcome::Search(_) => panic!("expected a scrape outcome"),
    }

    assert_eq!(s.calls(), 1);
    assert_eq!(p.calls(), 1);
}

#[tokio::test]
async fn outcome_serializes_with_operation_tag() {
    let dir = cache_dir();
    let sleuth = builder(&dir, &["s"])
        .with_connector(searcher("s"))
        .build()
        .unwrap();

    let outcome = sleuth
        .execute(Operation::Search, "query", &RequestOptions::new())
        .await;
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["operation"], "search");

    let back: Outcome = serde_json::from_value(json).unwrap();
    assert_eq!(back, outcome);
}

#[test]
fn options_deserialize_with_defaults() {
    let opts: RequestOptions =
        serde_json::from_str(r#"{ "data_type": "news", "preferred": "exa" }"#).unwrap();
    assert_eq!(opts.data_type, sleuth::DataType::News);
    assert_eq!(opts.preferred.as_deref(), Some("exa"));
    assert_eq!(opts.max_results, sleuth::DEFAULT_MAX_RESULTS);
    assert!(opts.timeout.is_none());
}
