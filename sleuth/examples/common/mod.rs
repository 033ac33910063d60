#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use sleuth::{SleuthConnector, SleuthError};
use sleuth_mock::{MockBehavior, MockConnector};

/// Log to stderr, honoring `RUST_LOG` (defaults to `sleuth=info`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sleuth=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Cache file for demos; kept out of the user's home directory.
#[must_use]
pub fn demo_cache_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join("sleuth-examples")
        .join(format!("{name}.db"))
}

/// Mock providers standing in for the real vendors.
///
/// `tavily` is down with a 503 so searches fall back to `exa`; `firecrawl` hits
/// a blocked page so scrapes fall back to `apify`.
#[must_use]
pub fn get_connectors() -> Vec<Arc<dyn SleuthConnector>> {
    println!("--- (Using mock connectors) ---");
    vec![
        Arc::new(
            MockConnector::builder("tavily")
                .vendor("Tavily")
                .search(MockBehavior::Fail(SleuthError::provider_status(
                    "tavily",
                    503,
                    "service unavailable",
                )))
                .build(),
        ),
        Arc::new(
            MockConnector::builder("exa")
                .vendor("Exa")
                .search_hits(5)
                .build(),
        ),
        Arc::new(
            MockConnector::builder("firecrawl")
                .vendor("Firecrawl")
                .scrape(MockBehavior::Return(sleuth::ScrapeResult::failed(
                    "",
                    "firecrawl",
                    "blocked by robots.txt",
                )))
                .build(),
        ),
        Arc::new(
            MockConnector::builder("apify")
                .vendor("Apify")
                .scrape_ok()
                .build(),
        ),
    ]
}
