mod common;
use common::{demo_cache_path, get_connectors, init_tracing};
use sleuth::{RequestOptions, Sleuth};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut builder = Sleuth::builder().cache_path(demo_cache_path("03_stats"));
    for c in get_connectors() {
        builder = builder.with_connector(c);
    }
    let sleuth = builder.build()?;
    let opts = RequestOptions::new();

    // The second call for the same query never reaches a provider.
    for _ in 0..2 {
        let report = sleuth.search("zoning variance denver", &opts).await;
        println!(
            "provider={:?} cached={} fallback={}",
            report.provider(),
            report.served_from_cache(),
            report.used_fallback()
        );
    }
    sleuth
        .scrape("https://example.com/parcel/77", &opts)
        .await;

    let evicted = sleuth.cache().evict_expired().await?;
    println!("evicted {evicted} expired entries\n");

    let stats = sleuth.stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
