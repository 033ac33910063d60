#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sleuth::{ScrapeResult, Sleuth, SleuthBuilder, SleuthError};
use sleuth_mock::{MockBehavior, MockConnector};
use tempfile::TempDir;

/// Fresh directory for one test's cache database.
pub fn cache_dir() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

/// Builder with an isolated cache, no quotas, and short timeouts.
///
/// Both try-orders are reset to `order` so the defaults never leak into tests.
pub fn builder(dir: &TempDir, order: &[&str]) -> SleuthBuilder {
    Sleuth::builder()
        .cache_path(dir.path().join("cache.db"))
        .without_quotas()
        .search_order(order.iter().copied())
        .scrape_order(order.iter().copied())
        .search_timeout(Duration::from_secs(2))
        .scrape_timeout(Duration::from_secs(2))
        .rate_limit_timeout(Duration::from_millis(100))
}

pub fn searcher(name: &'static str) -> Arc<MockConnector> {
    Arc::new(MockConnector::builder(name).search_hits(3).build())
}

pub fn failing_searcher(name: &'static str, err: SleuthError) -> Arc<MockConnector> {
    Arc::new(
        MockConnector::builder(name)
            .search(MockBehavior::Fail(err))
            .build(),
    )
}

pub fn empty_searcher(name: &'static str) -> Arc<MockConnector> {
    Arc::new(
        MockConnector::builder(name)
            .search(MockBehavior::Return(Vec::new()))
            .build(),
    )
}

pub fn hanging_searcher(name: &'static str) -> Arc<MockConnector> {
    Arc::new(MockConnector::builder(name).search(MockBehavior::Hang).build())
}

pub fn scraper(name: &'static str) -> Arc<MockConnector> {
    Arc::new(MockConnector::builder(name).scrape_ok().build())
}

/// Scraper that answers but reports the page as blocked.
pub fn blocked_scraper(name: &'static str, reason: &str) -> Arc<MockConnector> {
    let page = ScrapeResult::failed("https://fixture.example", name, reason);
    Arc::new(
        MockConnector::builder(name)
            .scrape(MockBehavior::Return(page))
            .build(),
    )
}

pub fn failing_scraper(name: &'static str, err: SleuthError) -> Arc<MockConnector> {
    Arc::new(
        MockConnector::builder(name)
            .scrape(MockBehavior::Fail(err))
            .build(),
    )
}
