mod common;
use common::{demo_cache_path, get_connectors, init_tracing};
use sleuth::{RequestOptions, Sleuth};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut builder = Sleuth::builder().cache_path(demo_cache_path("02_scrape"));
    for c in get_connectors() {
        builder = builder.with_connector(c);
    }
    let sleuth = builder.build()?;

    // firecrawl reports a blocked page; the orchestrator moves on to apify.
    let url = "https://example.com/listings/1200-main-st";
    let report = sleuth.scrape(url, &RequestOptions::new()).await;

    if report.response.success {
        println!(
            "scraped {} via {} (cached: {})\n",
            report.response.url, report.response.source_api, report.response.cached
        );
        println!("{}", report.response.markdown);
    } else {
        println!(
            "scrape failed: {}",
            report.response.error.as_deref().unwrap_or("unknown")
        );
    }

    Ok(())
}
