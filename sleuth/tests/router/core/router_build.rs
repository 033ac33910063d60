use std::time::Duration;

use sleuth::{ProviderQuota, RequestOptions, Sleuth, SleuthConfig, SleuthError};

use crate::helpers::{builder, cache_dir, searcher};

#[tokio::test]
async fn empty_registry_builds_and_reports_no_providers() {
    let dir = cache_dir();
    let sleuth = builder(&dir, &["a", "b"]).build().unwrap();

    let report = sleuth.search("anything", &RequestOptions::new()).await;
    assert!(!report.response.success());
    assert!(report.attempts.is_empty());
    assert_eq!(
        report.response.error.as_deref(),
        Some("no search providers available")
    );

    let page = sleuth
        .scrape("https://example.com", &RequestOptions::new())
        .await;
    assert!(!page.response.success);
    assert_eq!(
        page.response.error.as_deref(),
        Some("no scrape providers available")
    );
}

#[test]
fn zero_attempt_timeout_is_rejected() {
    let dir = cache_dir();
    let err = builder(&dir, &["a"])
        .search_timeout(Duration::ZERO)
        .build()
        .unwrap_err();
    assert!(matches!(err, SleuthError::InvalidArg(_)));
}

#[test]
fn degenerate_quota_is_rejected() {
    let dir = cache_dir();
    let err = builder(&dir, &["a"])
        .quota("a", ProviderQuota::new(0, Duration::from_secs(60), 1))
        .build()
        .unwrap_err();
    assert!(matches!(err, SleuthError::InvalidArg(_)));
}

#[test]
fn defaults_create_limiters_for_builtin_providers() {
    let dir = cache_dir();
    let sleuth = Sleuth::builder()
        .cache_path(dir.path().join("cache.db"))
        .build()
        .unwrap();

    let names: Vec<&str> = sleuth.limiters().keys().map(String::as_str).collect();
    assert_eq!(names, ["apify", "exa", "firecrawl", "tavily"]);
    assert_eq!(sleuth.limiter("apify").unwrap().max_concurrent(), 1);
    assert!(sleuth.limiter("unknown").is_none());
    assert_eq!(sleuth.config().search_order, ["tavily", "exa"]);
    assert_eq!(sleuth.config().scrape_order, ["firecrawl", "apify"]);
}

#[tokio::test]
async fn json_config_drives_order_and_quotas() {
    let dir = cache_dir();
    let cfg = SleuthConfig::from_json_str(
        r#"{
            "search_order": ["b", "a"],
            "quotas": {
                "a": {
                    "max_requests": 5,
                    "period": { "secs": 60, "nanos": 0 },
                    "max_concurrent": 1
                }
            }
        }"#,
    )
    .unwrap();

    let a = searcher("a");
    let b = searcher("b");
    let sleuth = Sleuth::builder()
        .config(cfg)
        .cache_path(dir.path().join("cache.db"))
        .with_connector(a.clone())
        .with_connector(b.clone())
        .build()
        .unwrap();

    assert_eq!(sleuth.limiters().len(), 1);
    assert_eq!(sleuth.limiter("a").unwrap().max_tokens(), 5.0);

    let report = sleuth.search("ordered", &RequestOptions::new()).await;
    assert_eq!(report.provider(), Some("b"));
    assert_eq!(a.search_calls(), 0);
}

#[test]
fn malformed_json_config_is_invalid_arg() {
    let err = SleuthConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, SleuthError::InvalidArg(_)));
}
