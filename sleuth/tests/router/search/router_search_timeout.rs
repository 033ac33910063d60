use std::time::Duration;

use sleuth::{RequestOptions, SleuthError};

use crate::helpers::{builder, cache_dir, hanging_searcher, searcher};

#[tokio::test]
async fn stalled_provider_times_out_and_falls_back() {
    let dir = cache_dir();
    let a = hanging_searcher("a");
    let b = searcher("b");
    let sleuth = builder(&dir, &["a", "b"])
        .search_timeout(Duration::from_millis(100))
        .with_connector(a.clone())
        .with_connector(b.clone())
        .build()
        .unwrap();

    let report = sleuth.search("q", &RequestOptions::new()).await;

    assert_eq!(report.provider(), Some("b"));
    assert!(matches!(
        report.attempts[0].error,
        Some(SleuthError::ProviderTimeout { .. })
    ));
}

#[tokio::test]
async fn per_request_timeout_overrides_the_default() {
    let dir = cache_dir();
    let a = hanging_searcher("a");
    let sleuth = builder(&dir, &["a"])
        .search_timeout(Duration::from_secs(30))
        .with_connector(a.clone())
        .build()
        .unwrap();

    let opts = RequestOptions::new().timeout(Duration::from_millis(50));
    let report = tokio::time::timeout(Duration::from_secs(5), sleuth.search("q", &opts))
        .await
        .expect("per-request timeout should apply");

    assert_eq!(report.response.error.as_deref(), Some("a: timed out"));
}
