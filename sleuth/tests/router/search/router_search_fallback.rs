use sleuth::{RequestOptions, SleuthError};

use crate::helpers::{builder, cache_dir, empty_searcher, failing_searcher, searcher};

#[tokio::test]
async fn first_failure_falls_back_to_second() {
    let dir = cache_dir();
    let a = failing_searcher("a", SleuthError::provider_status("a", 503, "unavailable"));
    let b = searcher("b");
    let sleuth = builder(&dir, &["a", "b"])
        .with_connector(a.clone())
        .with_connector(b.clone())
        .build()
        .unwrap();

    let report = sleuth.search("fallback", &RequestOptions::new()).await;

    assert!(report.response.success());
    assert_eq!(report.response.source_api, "b");
    assert_eq!(report.provider(), Some("b"));
    assert!(report.used_fallback());
    assert_eq!(report.failures().count(), 1);
    assert_eq!(report.attempts[0].status_code(), Some(503));
    assert!(report.attempts[0].retryable());
    assert_eq!(a.search_calls(), 1);
    assert_eq!(b.search_calls(), 1);
    assert_eq!(sleuth.stats().await.unwrap().fallbacks_used, 1);
}

#[tokio::test]
async fn success_on_first_provider_stops_the_sequence() {
    let dir = cache_dir();
    let a = searcher("a");
    let b = searcher("b");
    let sleuth = builder(&dir, &["a", "b"])
        .with_connector(a.clone())
        .with_connector(b.clone())
        .build()
        .unwrap();

    let report = sleuth.search("q", &RequestOptions::new()).await;

    assert_eq!(report.provider(), Some("a"));
    assert_eq!(b.search_calls(), 0);
    assert_eq!(sleuth.stats().await.unwrap().fallbacks_used, 0);
}

#[tokio::test]
async fn empty_result_set_triggers_fallback() {
    let dir = cache_dir();
    let a = empty_searcher("a");
    let b = searcher("b");
    let sleuth = builder(&dir, &["a", "b"])
        .with_connector(a.clone())
        .with_connector(b.clone())
        .build()
        .unwrap();

    let report = sleuth.search("obscure", &RequestOptions::new()).await;

    assert_eq!(report.provider(), Some("b"));
    let reason = report.attempts[0].error.as_ref().unwrap().to_string();
    assert!(reason.contains("search returned no results"), "{reason}");
}

#[tokio::test]
async fn non_provider_errors_are_attributed_to_the_provider() {
    let dir = cache_dir();
    let a = failing_searcher("a", SleuthError::Serialization("bad json".into()));
    let b = searcher("b");
    let sleuth = builder(&dir, &["a", "b"])
        .with_connector(a)
        .with_connector(b)
        .build()
        .unwrap();

    let report = sleuth.search("q", &RequestOptions::new()).await;

    match &report.attempts[0].error {
        Some(SleuthError::Provider {
            provider, message, ..
        }) => {
            assert_eq!(provider, "a");
            assert!(message.contains("bad json"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
