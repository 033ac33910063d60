use sleuth::{RequestOptions, SleuthError};

use crate::helpers::{builder, cache_dir, failing_searcher};

#[tokio::test]
async fn exhaustion_lists_every_provider_and_reason() {
    let dir = cache_dir();
    let a = failing_searcher("a", SleuthError::provider_status("a", 503, "down"));
    let b = failing_searcher("b", SleuthError::provider("b", "bad key"));
    let sleuth = builder(&dir, &["a", "b"])
        .with_connector(a.clone())
        .with_connector(b.clone())
        .build()
        .unwrap();

    let report = sleuth.search("doomed", &RequestOptions::new()).await;

    assert!(!report.response.success());
    assert!(report.response.results.is_empty());
    assert_eq!(report.response.query, "doomed");
    assert_eq!(report.response.source_api, "none");
    assert_eq!(
        report.response.error.as_deref(),
        Some("a: HTTP 503: down | b: bad key")
    );
    assert_eq!(report.attempts.len(), 2);
    assert!(report.provider().is_none());
    assert_eq!(a.search_calls(), 1);
    assert_eq!(b.search_calls(), 1);
    assert_eq!(sleuth.stats().await.unwrap().fallbacks_used, 0);
}

#[tokio::test]
async fn every_provider_is_tried_at_most_once() {
    let dir = cache_dir();
    let a = failing_searcher("a", SleuthError::provider_status("a", 429, "slow down"));
    let sleuth = builder(&dir, &["a"])
        .with_connector(a.clone())
        .build()
        .unwrap();

    let report = sleuth.search("q", &RequestOptions::new().prefer("a")).await;

    assert_eq!(report.attempts.len(), 1);
    assert_eq!(a.search_calls(), 1);
}
