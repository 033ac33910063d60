use std::time::Duration;

use sleuth::{RequestOptions, SleuthError};
use sleuth_mock::{MockBehavior, MockConnector};

use crate::helpers::{blocked_scraper, builder, cache_dir, failing_scraper};

#[tokio::test]
async fn exhausted_scrape_reports_each_reason() {
    let dir = cache_dir();
    let a = failing_scraper("a", SleuthError::provider_status("a", 500, "internal"));
    let b = blocked_scraper("b", "empty body");
    let sleuth = builder(&dir, &["a", "b"])
        .with_connector(a)
        .with_connector(b)
        .build()
        .unwrap();

    let report = sleuth
        .scrape("https://example.com", &RequestOptions::new())
        .await;

    assert!(!report.response.success);
    assert!(report.response.markdown.is_empty());
    assert_eq!(report.response.url, "https://example.com");
    assert_eq!(report.response.source_api, "none");
    assert_eq!(
        report.response.error.as_deref(),
        Some("a: HTTP 500: internal | b: scrape returned error: empty body")
    );
}

#[tokio::test]
async fn stalled_scraper_reports_timeout() {
    let dir = cache_dir();
    let a = std::sync::Arc::new(
        MockConnector::builder("a")
            .scrape(MockBehavior::Hang)
            .build(),
    );
    let sleuth = builder(&dir, &["a"])
        .scrape_timeout(Duration::from_millis(50))
        .with_connector(a)
        .build()
        .unwrap();

    let report = sleuth
        .scrape("https://example.com", &RequestOptions::new())
        .await;

    assert_eq!(report.response.error.as_deref(), Some("a: timed out"));
}
