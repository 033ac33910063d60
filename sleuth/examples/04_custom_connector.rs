use std::sync::Arc;

use async_trait::async_trait;
use sleuth::{
    ProviderRegistry, RequestOptions, SearchProvider, SearchRequest, SearchResponse, SearchResult,
    Sleuth, SleuthConnector, SleuthError,
};

/// Searches a fixed in-memory corpus by substring.
struct CorpusConnector {
    docs: Vec<(&'static str, &'static str)>,
}

#[async_trait]
impl SearchProvider for CorpusConnector {
    async fn search(&self, req: SearchRequest) -> Result<SearchResponse, SleuthError> {
        let needle = req.query.to_lowercase();
        let hits = self
            .docs
            .iter()
            .filter(|(title, _)| title.to_lowercase().contains(&needle))
            .take(req.max_results)
            .map(|(title, url)| SearchResult::new(*title, *url, "", 1.0, self.name()))
            .collect();
        Ok(SearchResponse::new(req.query, hits, self.name()))
    }
}

impl SleuthConnector for CorpusConnector {
    fn name(&self) -> &'static str {
        "corpus"
    }

    fn vendor(&self) -> &'static str {
        "Local"
    }

    fn as_search_provider(&self) -> Option<&dyn SearchProvider> {
        Some(self)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = ProviderRegistry::new();

    // Real vendors are only registered when their key is present.
    let key = ProviderRegistry::credential_from_env("TAVILY_API_KEY");
    registry.register_if_configured("tavily", key, |_key| {
        Arc::new(sleuth_mock::MockConnector::healthy("tavily")) as Arc<dyn SleuthConnector>
    });
    registry.register(Arc::new(CorpusConnector {
        docs: vec![
            ("Harbor District rezoning", "https://city.example/harbor"),
            ("Harbor parcel ownership history", "https://county.example/parcels/9"),
            ("Downtown office vacancy", "https://news.example/vacancy"),
        ],
    }));

    let sleuth = Sleuth::builder()
        .registry(registry)
        .search_order(["tavily", "corpus"])
        .without_quotas()
        .cache_path(std::env::temp_dir().join("sleuth-examples/04_custom.db"))
        .build()?;

    let report = sleuth.search("harbor", &RequestOptions::new()).await;
    println!("answered by {:?}", report.provider());
    for hit in report.response.results {
        println!("- {} <{}>", hit.title, hit.url);
    }
    Ok(())
}
