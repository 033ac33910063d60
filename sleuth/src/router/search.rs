use sleuth_core::{Report, SearchRequest, SearchResponse, SleuthError};

use crate::Sleuth;
use crate::core::Counters;
use crate::router::RequestOptions;

impl Sleuth {
    /// Search the web for `query`.
    ///
    /// Behavior and trade-offs:
    /// - Providers are tried one at a time: `opts.preferred` first, then the
    ///   configured search order. There is no parallel fan-out.
    /// - A fresh cache entry for a candidate answers immediately without touching
    ///   its rate limiter or the network.
    /// - An empty result set counts as a failure and moves on to the next provider.
    /// - Never fails; on exhaustion the response is empty and `error` explains
    ///   every attempt.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "sleuth::router",
            skip(self, opts),
            fields(data_type = %opts.data_type, preferred = ?opts.preferred),
        )
    )]
    pub async fn search(&self, query: &str, opts: &RequestOptions) -> Report<SearchResponse> {
        Counters::bump(&self.counters.total_searches);
        let timeout = opts.timeout.unwrap_or(self.cfg.search_timeout);
        let max_results = opts.max_results;

        self.route(query, opts, timeout, |c, timeout| {
            c.as_search_provider()?;
            let req = SearchRequest::new(query)
                .max_results(max_results)
                .timeout(timeout);
            Some(async move {
                match c.as_search_provider() {
                    Some(p) => p.search(req).await,
                    None => Err(SleuthError::unsupported("search")),
                }
            })
        })
        .await
    }
}
