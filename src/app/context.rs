use std::sync::Arc;

use crate::app::error::Result;
use crate::cache::{BatchServer, CacheBuilder, CacheStore, RefreshPolicy, Refresher};
use crate::config::Config;
use crate::domain::SourceDescriptor;
use crate::extract::SourceExtractors;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::server::ApiState;

pub struct AppContext {
    pub config: Config,
    pub sources: Arc<Vec<SourceDescriptor>>,
    pub fetcher: Arc<dyn Fetcher>,
    pub builder: Arc<CacheBuilder>,
    pub refresher: Arc<Refresher>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Wire the pipeline around an existing fetcher.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let sources = Arc::new(config.sources.clone());
        let relevance = Arc::new(config.relevance.clone());
        let extractors = Arc::new(SourceExtractors::standard(
            fetcher.clone(),
            relevance,
            &config.fetch,
        ));

        let (min_ms, max_ms) = config.fetch.politeness_range();
        let builder = Arc::new(
            CacheBuilder::new(sources.clone(), extractors, config.cache.max_images)
                .with_workers(config.fetch.workers)
                .with_politeness(min_ms, max_ms),
        );

        let refresher = Arc::new(Refresher::new(
            Arc::new(CacheStore::new()),
            builder.clone(),
            RefreshPolicy::from(&config.cache),
        ));

        Self {
            config,
            sources,
            fetcher,
            builder,
            refresher,
        }
    }

    pub fn api_state(&self) -> ApiState {
        ApiState {
            refresher: self.refresher.clone(),
            batches: BatchServer::new(self.config.cache.max_batch),
            default_batch: self.config.cache.default_batch,
            sources: self.sources.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SnapshotBuilder;
    use crate::domain::Layer;
    use crate::fetcher::fake::StaticFetcher;

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/"><channel><title>T</title>
<item><title>Vintage denim jacket</title><link>https://example.com/a</link>
<media:content url="https://cdn.example.com/img/a.jpg" medium="image"/></item>
</channel></rss>"#;

    fn config() -> Config {
        let mut config = Config::default();
        config.sources = vec![
            SourceDescriptor::feed(
                "https://example.com/feed",
                "Example",
                Layer::L2,
                "Streetwear",
                4,
            ),
            SourceDescriptor::feed(
                "https://down.example.com/feed",
                "Down",
                Layer::L3,
                "Streetwear",
                4,
            ),
        ];
        config.fetch.politeness_min_ms = 0;
        config.fetch.politeness_max_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_pipeline_builds_from_configured_sources() {
        let fetcher = Arc::new(StaticFetcher::new().with("https://example.com/feed", FEED));
        let ctx = AppContext::with_fetcher(config(), fetcher);

        let snapshot = ctx.builder.build().await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.images()[0].source_label, "Example");
        assert_eq!(snapshot.images()[0].layer_tag, Layer::L2);
    }

    #[test]
    fn test_api_state_reflects_config() {
        let mut config = config();
        config.cache.default_batch = 25;
        let ctx = AppContext::with_fetcher(config, Arc::new(StaticFetcher::new()));

        let state = ctx.api_state();

        assert_eq!(state.sources, 2);
        assert_eq!(state.default_batch, 25);
    }
}
