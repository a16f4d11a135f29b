use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::app::Result;
use crate::config::FetchConfig;
use crate::domain::{CandidateImage, SourceDescriptor};
use crate::extract::discovery::DiscoveryChain;
use crate::extract::entries::parse_feed;
use crate::extract::Extractor;
use crate::fetcher::Fetcher;
use crate::filter::RelevanceFilter;

/// Reads a feed source and finds one image per relevant, recent entry.
pub struct FeedExtractor {
    fetcher: Arc<dyn Fetcher>,
    relevance: Arc<RelevanceFilter>,
    config: FetchConfig,
}

impl FeedExtractor {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        relevance: Arc<RelevanceFilter>,
        config: FetchConfig,
    ) -> Self {
        Self {
            fetcher,
            relevance,
            config,
        }
    }
}

#[async_trait]
impl Extractor for FeedExtractor {
    async fn extract(&self, source: &SourceDescriptor) -> Result<Vec<CandidateImage>> {
        let body = self
            .fetcher
            .fetch(&source.endpoint, self.config.feed_timeout())
            .await?;
        let entries = parse_feed(&body)?;

        let chain = DiscoveryChain::for_feed(
            self.fetcher.clone(),
            self.config.article_timeout(),
            self.config.article_lookups,
        );
        let cutoff = Utc::now() - self.config.recency_window();

        let mut images = Vec::new();
        for entry in entries {
            if images.len() >= source.quota {
                break;
            }
            if entry.is_older_than(cutoff) {
                continue;
            }
            if !self.relevance.is_relevant(&entry.context_text()) {
                continue;
            }
            let Some(image_url) = chain.discover(&entry).await else {
                continue;
            };

            let origin = entry.link.as_deref().unwrap_or(&source.endpoint);
            images.push(CandidateImage::new(
                source,
                image_url,
                &entry.title,
                origin,
                Utc::now(),
            ));
        }

        tracing::info!(source = %source.label, count = images.len(), "Extracted feed images");
        Ok(images)
    }
}
