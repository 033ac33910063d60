mod common;
use common::{demo_cache_path, get_connectors, init_tracing};
use sleuth::{DataType, RequestOptions, Sleuth};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // 1. Register providers. Default search order is tavily, then exa.
    let mut builder = Sleuth::builder().cache_path(demo_cache_path("01_search"));
    for c in get_connectors() {
        builder = builder.with_connector(c);
    }
    let sleuth = builder.build()?;

    // 2. Search. tavily fails with a 503, so exa answers.
    let opts = RequestOptions::new()
        .data_type(DataType::Market)
        .max_results(3);
    let report = sleuth.search("austin multifamily cap rates", &opts).await;

    for attempt in &report.attempts {
        match &attempt.error {
            Some(e) => println!("  {:<10} failed: {e}", attempt.provider),
            None if attempt.cached => println!("  {:<10} answered from cache", attempt.provider),
            None => println!("  {:<10} answered", attempt.provider),
        }
    }

    // 3. Print the hits.
    println!("\n## Results via {}:", report.response.source_api);
    println!("{:<6} | {:<40} | URL", "Score", "Title");
    println!("{:-<7}|{:-<42}|{:-<30}", "", "", "");
    for hit in &report.response.results {
        println!("{:<6.2} | {:<40} | {}", hit.relevance_score, hit.title, hit.url);
    }

    Ok(())
}
