use std::time::{Duration, Instant};

use futures::future::join_all;
use sleuth::{ProviderQuota, RequestOptions, SleuthError, create_limiters};

use crate::helpers::{builder, cache_dir, searcher};

#[tokio::test]
async fn exhausted_quota_falls_back_to_next_provider() {
    let dir = cache_dir();
    let a = searcher("a");
    let b = searcher("b");
    let sleuth = builder(&dir, &["a", "b"])
        .quota("a", ProviderQuota::new(1, Duration::from_secs(3600), 1))
        .with_connector(a.clone())
        .with_connector(b.clone())
        .build()
        .unwrap();
    let opts = RequestOptions::new();

    let first = sleuth.search("one", &opts).await;
    assert_eq!(first.provider(), Some("a"));

    let second = sleuth.search("two", &opts).await;
    assert_eq!(second.provider(), Some("b"));
    assert!(second.used_fallback());
    assert!(matches!(
        second.attempts[0].error,
        Some(SleuthError::RateLimitExceeded { .. })
    ));
    assert_eq!(a.search_calls(), 1);

    let stats = sleuth.limiter("a").unwrap().stats();
    assert_eq!(stats.requests_made, 1);
    assert_eq!(stats.requests_rejected, 1);
    assert_eq!(stats.available_slots, 1);
}

#[tokio::test]
async fn rate_limit_reason_appears_in_exhaustion_summary() {
    let dir = cache_dir();
    let a = searcher("a");
    let sleuth = builder(&dir, &["a"])
        .quota("a", ProviderQuota::new(1, Duration::from_secs(3600), 1))
        .with_connector(a.clone())
        .build()
        .unwrap();

    sleuth.search("one", &RequestOptions::new()).await;
    let report = sleuth.search("two", &RequestOptions::new()).await;

    let error = report.response.error.unwrap();
    assert!(error.starts_with("a: rate limit exceeded (waited "), "{error}");
}

#[tokio::test]
async fn concurrency_cap_serializes_overlapping_requests() {
    let dir = cache_dir();
    let slow = std::sync::Arc::new(
        sleuth_mock::MockConnector::builder("a")
            .search_hits(2)
            .delay(Duration::from_millis(100))
            .build(),
    );
    let sleuth = builder(&dir, &["a"])
        .quota("a", ProviderQuota::new(100, Duration::from_secs(60), 1))
        .with_connector(slow.clone())
        .build()
        .unwrap();
    let opts = RequestOptions::new();

    let started = Instant::now();
    let reports = join_all(["x", "y", "z"].map(|q| sleuth.search(q, &opts))).await;

    assert!(reports.iter().all(|r| r.response.success()));
    assert!(started.elapsed() >= Duration::from_millis(280));
    assert_eq!(slow.search_calls(), 3);
    let stats = sleuth.limiter("a").unwrap().stats();
    assert_eq!(stats.requests_made, 3);
    assert_eq!(stats.available_slots, 1);
}

#[tokio::test]
async fn limiters_are_shared_between_orchestrators() {
    let quotas = [("a".to_string(), ProviderQuota::new(1, Duration::from_secs(3600), 1))]
        .into_iter()
        .collect();
    let shared = create_limiters(&quotas).unwrap();

    let dir1 = cache_dir();
    let dir2 = cache_dir();
    let first = builder(&dir1, &["a"])
        .limiters(shared.clone())
        .with_connector(searcher("a"))
        .build()
        .unwrap();
    let second = builder(&dir2, &["a"])
        .limiters(shared.clone())
        .with_connector(searcher("a"))
        .build()
        .unwrap();

    assert!(first.search("q", &RequestOptions::new()).await.response.success());
    let starved = second.search("q", &RequestOptions::new()).await;
    assert!(!starved.response.success());
    assert_eq!(shared["a"].stats().requests_rejected, 1);
}
