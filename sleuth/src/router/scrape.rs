use sleuth_core::{Report, ScrapeRequest, ScrapeResult, SleuthError};

use crate::Sleuth;
use crate::core::Counters;
use crate::router::RequestOptions;

impl Sleuth {
    /// Scrape `url` into markdown.
    ///
    /// Behavior and trade-offs:
    /// - Same routing as [`search`](Self::search) over the scrape order.
    /// - A result with `success == false` (blocked page, empty body) is treated
    ///   like a provider error and triggers fallback.
    /// - Never fails; on exhaustion `success` is false and `error` lists each
    ///   provider's reason.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "sleuth::router",
            skip(self, opts),
            fields(data_type = %opts.data_type, preferred = ?opts.preferred),
        )
    )]
    pub async fn scrape(&self, url: &str, opts: &RequestOptions) -> Report<ScrapeResult> {
        Counters::bump(&self.counters.total_scrapes);
        let timeout = opts.timeout.unwrap_or(self.cfg.scrape_timeout);

        self.route(url, opts, timeout, |c, timeout| {
            c.as_scrape_provider()?;
            let req = ScrapeRequest::new(url).timeout(timeout);
            Some(async move {
                match c.as_scrape_provider() {
                    Some(p) => p.scrape(req).await,
                    None => Err(SleuthError::unsupported("scrape")),
                }
            })
        })
        .await
    }
}
