//! sleuth-mock
//!
//! Scripted connectors for CI-safe tests and examples. Each [`MockConnector`]
//! advertises only the capabilities it was built with, counts its calls, and
//! follows a [`MockBehavior`] that tests can swap at runtime.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sleuth_core::connector::{ScrapeProvider, SearchProvider, SleuthConnector};
use sleuth_core::{
    ScrapeRequest, ScrapeResult, SearchRequest, SearchResponse, SearchResult, SleuthError,
};
use tokio::sync::Mutex;

pub mod fixtures;

/// Instruction for how a call should behave.
#[derive(Debug, Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value.
    Return(T),
    /// Fail with the provided error.
    Fail(SleuthError),
    /// Never complete (simulate a stalled provider).
    Hang,
}

/// In-memory connector driven by [`MockBehavior`] rules.
pub struct MockConnector {
    name: &'static str,
    vendor: &'static str,
    delay: Duration,
    supports_search: bool,
    supports_scrape: bool,
    search_rule: Mutex<MockBehavior<Vec<SearchResult>>>,
    scrape_rule: Mutex<MockBehavior<ScrapeResult>>,
    search_calls: AtomicUsize,
    scrape_calls: AtomicUsize,
    seen: std::sync::Mutex<Vec<String>>,
}

/// Builder for [`MockConnector`].
pub struct MockConnectorBuilder {
    name: &'static str,
    vendor: &'static str,
    delay: Duration,
    search: Option<MockBehavior<Vec<SearchResult>>>,
    scrape: Option<MockBehavior<ScrapeResult>>,
}

impl MockConnectorBuilder {
    /// Serve searches according to `behavior`.
    #[must_use]
    pub fn search(mut self, behavior: MockBehavior<Vec<SearchResult>>) -> Self {
        self.search = Some(behavior);
        self
    }

    /// Serve scrapes according to `behavior`.
    #[must_use]
    pub fn scrape(mut self, behavior: MockBehavior<ScrapeResult>) -> Self {
        self.scrape = Some(behavior);
        self
    }

    /// Answer searches with `n` fixture hits.
    #[must_use]
    pub fn search_hits(self, n: usize) -> Self {
        let hits = fixtures::search_hits(self.name, "fixture", n);
        self.search(MockBehavior::Return(hits))
    }

    /// Answer scrapes with a fixture page.
    #[must_use]
    pub fn scrape_ok(self) -> Self {
        let page = fixtures::page(self.name, "https://fixture.example");
        self.scrape(MockBehavior::Return(page))
    }

    /// Sleep this long before every call.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Vendor label.
    #[must_use]
    pub const fn vendor(mut self, vendor: &'static str) -> Self {
        self.vendor = vendor;
        self
    }

    /// Finish the connector.
    #[must_use]
    pub fn build(self) -> MockConnector {
        MockConnector {
            name: self.name,
            vendor: self.vendor,
            delay: self.delay,
            supports_search: self.search.is_some(),
            supports_scrape: self.scrape.is_some(),
            search_rule: Mutex::new(
                self.search
                    .unwrap_or_else(|| MockBehavior::Fail(SleuthError::unsupported("search"))),
            ),
            scrape_rule: Mutex::new(
                self.scrape
                    .unwrap_or_else(|| MockBehavior::Fail(SleuthError::unsupported("scrape"))),
            ),
            search_calls: AtomicUsize::new(0),
            scrape_calls: AtomicUsize::new(0),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl MockConnector {
    /// Start building a connector named `name`.
    #[must_use]
    pub const fn builder(name: &'static str) -> MockConnectorBuilder {
        MockConnectorBuilder {
            name,
            vendor: "Mock",
            delay: Duration::ZERO,
            search: None,
            scrape: None,
        }
    }

    /// Connector that answers both operations with fixture data.
    #[must_use]
    pub fn healthy(name: &'static str) -> Self {
        Self::builder(name).search_hits(3).scrape_ok().build()
    }

    /// Replace the search rule.
    pub async fn set_search_behavior(&self, behavior: MockBehavior<Vec<SearchResult>>) {
        *self.search_rule.lock().await = behavior;
    }

    /// Replace the scrape rule.
    pub async fn set_scrape_behavior(&self, behavior: MockBehavior<ScrapeResult>) {
        *self.scrape_rule.lock().await = behavior;
    }

    /// Number of `search` invocations so far.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of `scrape` invocations so far.
    pub fn scrape_calls(&self) -> usize {
        self.scrape_calls.load(Ordering::SeqCst)
    }

    /// Total invocations across both operations.
    pub fn calls(&self) -> usize {
        self.search_calls() + self.scrape_calls()
    }

    /// Queries and URLs received, in arrival order.
    pub fn seen(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    async fn enter(&self, counter: &AtomicUsize, target: &str) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(target.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl SleuthConnector for MockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        self.vendor
    }

    fn as_search_provider(&self) -> Option<&dyn SearchProvider> {
        self.supports_search.then_some(self as &dyn SearchProvider)
    }

    fn as_scrape_provider(&self) -> Option<&dyn ScrapeProvider> {
        self.supports_scrape.then_some(self as &dyn ScrapeProvider)
    }
}

#[async_trait]
impl SearchProvider for MockConnector {
    async fn search(&self, req: SearchRequest) -> Result<SearchResponse, SleuthError> {
        self.enter(&self.search_calls, &req.query).await;
        let rule = self.search_rule.lock().await.clone();
        match rule {
            MockBehavior::Return(mut hits) => {
                hits.truncate(req.max_results);
                Ok(SearchResponse::new(req.query, hits, self.name))
            }
            MockBehavior::Fail(e) => Err(e),
            MockBehavior::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl ScrapeProvider for MockConnector {
    async fn scrape(&self, req: ScrapeRequest) -> Result<ScrapeResult, SleuthError> {
        self.enter(&self.scrape_calls, &req.url).await;
        let rule = self.scrape_rule.lock().await.clone();
        match rule {
            MockBehavior::Return(mut page) => {
                page.url = req.url;
                page.source_api = self.name.to_string();
                Ok(page)
            }
            MockBehavior::Fail(e) => Err(e),
            MockBehavior::Hang => std::future::pending().await,
        }
    }
}
