use std::time::Duration;

use sleuth::{DataType, ProviderQuota, RequestOptions, SleuthError};

use crate::helpers::{builder, cache_dir, failing_searcher, scraper, searcher};

#[tokio::test]
async fn repeated_search_is_served_from_cache() {
    let dir = cache_dir();
    let a = searcher("a");
    let sleuth = builder(&dir, &["a"]).with_connector(a.clone()).build().unwrap();
    let opts = RequestOptions::new();

    let first = sleuth.search("rust async", &opts).await;
    assert!(first.response.success());
    assert!(!first.response.cached);
    assert!(!first.served_from_cache());

    let second = sleuth.search("rust async", &opts).await;
    assert!(second.response.success());
    assert!(second.response.cached);
    assert!(second.served_from_cache());
    assert_eq!(second.response.results, first.response.results);
    assert_eq!(a.search_calls(), 1);
}

#[tokio::test]
async fn cache_hit_does_not_spend_a_token() {
    let dir = cache_dir();
    let a = searcher("a");
    let sleuth = builder(&dir, &["a"])
        .quota("a", ProviderQuota::new(10, Duration::from_secs(3600), 1))
        .with_connector(a.clone())
        .build()
        .unwrap();
    let opts = RequestOptions::new();

    sleuth.search("q", &opts).await;
    sleuth.search("q", &opts).await;
    sleuth.search("q", &opts).await;

    let stats = sleuth.limiter("a").unwrap().stats();
    assert_eq!(stats.requests_made, 1);
    assert!(stats.tokens_remaining >= 9.0 && stats.tokens_remaining < 9.1);
    assert_eq!(a.search_calls(), 1);
}

#[tokio::test]
async fn cached_answer_of_a_later_candidate_is_used_without_calling_the_first() {
    let dir = cache_dir();
    let a = searcher("a");
    let b = searcher("b");
    let sleuth = builder(&dir, &["a", "b"])
        .with_connector(a.clone())
        .with_connector(b.clone())
        .build()
        .unwrap();

    // Warm b's entry through an explicit preference.
    let warm = sleuth.search("q", &RequestOptions::new().prefer("b")).await;
    assert_eq!(warm.provider(), Some("b"));

    // a has no entry and answers live; b's entry is untouched.
    let live = sleuth.search("q", &RequestOptions::new()).await;
    assert_eq!(live.provider(), Some("a"));
    assert!(!live.response.cached);

    let again = sleuth.search("q", &RequestOptions::new().prefer("b")).await;
    assert!(again.served_from_cache());
    assert_eq!(b.search_calls(), 1);
    assert_eq!(a.search_calls(), 1);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let dir = cache_dir();
    let a = failing_searcher("a", SleuthError::provider_status("a", 503, "down"));
    let sleuth = builder(&dir, &["a"]).with_connector(a.clone()).build().unwrap();

    sleuth.search("q", &RequestOptions::new()).await;
    sleuth.search("q", &RequestOptions::new()).await;

    assert_eq!(a.search_calls(), 2);
    assert_eq!(sleuth.cache().len().await.unwrap(), 0);
}

#[tokio::test]
async fn expired_entry_goes_back_to_the_provider() {
    let dir = cache_dir();
    let a = searcher("a");
    let sleuth = builder(&dir, &["a"])
        .ttl("news", Duration::from_millis(200))
        .with_connector(a.clone())
        .build()
        .unwrap();
    let opts = RequestOptions::new().data_type(DataType::News);

    sleuth.search("breaking", &opts).await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    let report = sleuth.search("breaking", &opts).await;

    assert!(!report.response.cached);
    assert_eq!(a.search_calls(), 2);
    let stats = sleuth.cache().stats().await.unwrap();
    assert_eq!(stats.evictions, 1);
}

#[tokio::test]
async fn scrape_and_search_entries_do_not_collide() {
    let dir = cache_dir();
    let both = std::sync::Arc::new(sleuth_mock::MockConnector::healthy("a"));
    let sleuth = builder(&dir, &["a"]).with_connector(both.clone()).build().unwrap();
    let target = "https://example.com/page";

    sleuth.search(target, &RequestOptions::new()).await;
    let page = sleuth.scrape(target, &RequestOptions::new()).await;

    assert!(page.response.success);
    assert!(!page.response.cached);
    assert_eq!(both.search_calls(), 1);
    assert_eq!(both.scrape_calls(), 1);
    assert_eq!(sleuth.cache().len().await.unwrap(), 2);
}

#[tokio::test]
async fn broken_cache_degrades_to_warnings() {
    let dir = cache_dir();
    let a = scraper("a");
    let sleuth = builder(&dir, &["a"]).with_connector(a.clone()).build().unwrap();
    sleuth.cache().close();

    let report = sleuth
        .scrape("https://example.com", &RequestOptions::new())
        .await;

    assert!(report.response.success);
    assert_eq!(report.provider(), Some("a"));
    assert_eq!(report.warnings.len(), 2);
    assert!(
        report
            .warnings
            .iter()
            .all(|w| matches!(w, SleuthError::Storage(_)))
    );
}
