//! Per-source image extraction.
//!
//! # Architecture
//!
//! ```text
//! SourceDescriptor → Fetcher → FeedExtractor / PageExtractor → Vec<CandidateImage>
//! ```
//!
//! Extractors report a whole-source failure (unreachable endpoint, malformed
//! document) as an `Err`; per-entry problems such as a missing image or a bad
//! date are skipped silently.

pub mod discovery;
pub mod entries;
pub mod feed;
pub mod html;
pub mod page;

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::Result;
use crate::config::FetchConfig;
use crate::domain::{CandidateImage, SourceDescriptor, SourceKind};
use crate::fetcher::Fetcher;
use crate::filter::RelevanceFilter;

pub use feed::FeedExtractor;
pub use page::PageExtractor;

/// Produces candidate images for one source, at most `source.quota` of them.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, source: &SourceDescriptor) -> Result<Vec<CandidateImage>>;
}

/// Routes each source to the extractor for its kind.
pub struct SourceExtractors {
    feed: Arc<dyn Extractor>,
    page: Arc<dyn Extractor>,
}

impl SourceExtractors {
    pub fn new(feed: Arc<dyn Extractor>, page: Arc<dyn Extractor>) -> Self {
        Self { feed, page }
    }

    pub fn standard(
        fetcher: Arc<dyn Fetcher>,
        relevance: Arc<RelevanceFilter>,
        config: &FetchConfig,
    ) -> Self {
        Self::new(
            Arc::new(FeedExtractor::new(fetcher.clone(), relevance.clone(), config.clone())),
            Arc::new(PageExtractor::new(fetcher, relevance, config.clone())),
        )
    }
}

#[async_trait]
impl Extractor for SourceExtractors {
    async fn extract(&self, source: &SourceDescriptor) -> Result<Vec<CandidateImage>> {
        match source.kind {
            SourceKind::Feed => self.feed.extract(source).await,
            SourceKind::Page => self.page.extract(source).await,
        }
    }
}
