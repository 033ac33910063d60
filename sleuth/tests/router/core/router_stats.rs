use std::time::Duration;

use sleuth::{ProviderQuota, RequestOptions, SleuthError};

use crate::helpers::{builder, cache_dir, failing_searcher, scraper, searcher};

#[tokio::test]
async fn stats_aggregate_counters_cache_and_limiters() {
    let dir = cache_dir();
    let a = failing_searcher("a", SleuthError::provider_status("a", 500, "boom"));
    let b = searcher("b");
    let p = scraper("p");
    let sleuth = builder(&dir, &["a", "b", "p"])
        .quota("b", ProviderQuota::new(50, Duration::from_secs(60), 2))
        .with_connector(a.clone())
        .with_connector(b.clone())
        .with_connector(p.clone())
        .build()
        .unwrap();
    let opts = RequestOptions::new();

    sleuth.search("first", &opts).await;
    sleuth.search("first", &opts).await;
    sleuth.search("second", &opts).await;
    sleuth.scrape("https://example.com", &opts).await;

    let stats = sleuth.stats().await.unwrap();
    assert_eq!(stats.total_searches, 3);
    assert_eq!(stats.total_scrapes, 1);
    // Live answers from b after a failed; the repeated query was a cache hit on b.
    assert_eq!(stats.fallbacks_used, 2);

    assert_eq!(stats.cache.stores, 3);
    assert_eq!(stats.cache.hits, 1);
    assert_eq!(stats.cache.total_entries, 3);

    assert_eq!(stats.rate_limiters.len(), 1);
    let b_stats = &stats.rate_limiters["b"];
    assert_eq!(b_stats.provider, "b");
    assert_eq!(b_stats.requests_made, 2);
    assert_eq!(b_stats.requests_rejected, 0);
    assert_eq!(b_stats.available_slots, 2);
}

#[tokio::test]
async fn fresh_orchestrator_reports_zeroes() {
    let dir = cache_dir();
    let sleuth = builder(&dir, &["a"]).build().unwrap();

    let stats = sleuth.stats().await.unwrap();
    assert_eq!(stats.total_searches, 0);
    assert_eq!(stats.total_scrapes, 0);
    assert_eq!(stats.fallbacks_used, 0);
    assert_eq!(stats.cache.total_entries, 0);
    assert!(stats.rate_limiters.is_empty());
}

#[tokio::test]
async fn stats_serialize_to_json() {
    let dir = cache_dir();
    let sleuth = builder(&dir, &["a"])
        .quota("a", ProviderQuota::new(5, Duration::from_secs(60), 1))
        .build()
        .unwrap();

    let json = serde_json::to_value(sleuth.stats().await.unwrap()).unwrap();
    assert_eq!(json["rate_limiters"]["a"]["max_tokens"], 5.0);
    assert_eq!(json["total_searches"], 0);
}
