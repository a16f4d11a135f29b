use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};

use crate::app::Result;
use crate::config::FetchConfig;
use crate::domain::{CandidateImage, SourceDescriptor};
use crate::extract::html::{self, GALLERY_SRC_ATTRS};
use crate::extract::Extractor;
use crate::fetcher::Fetcher;
use crate::filter::RelevanceFilter;

/// Gallery images declaring a smaller width are thumbnails or UI chrome.
const MIN_WIDTH_PX: u32 = 150;

/// Reads a single curated page: its preview image plus relevant gallery images.
pub struct PageExtractor {
    fetcher: Arc<dyn Fetcher>,
    relevance: Arc<RelevanceFilter>,
    config: FetchConfig,
}

impl PageExtractor {
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
impl Extractor for PageExtractor {
    async fn extract(&self, source: &SourceDescriptor) -> Result<Vec<CandidateImage>> {
        let page = self
            .fetcher
            .fetch_text(&source.endpoint, self.config.page_timeout())
            .await?;

        let images = extract_page(&page, source, &self.relevance, Utc::now());

        tracing::info!(source = %source.label, count = images.len(), "Extracted page images");
        Ok(images)
    }
}

/// Pull candidates out of an already fetched page.
///
/// The preview image is taken without a relevance check since the page itself
/// is curated. Gallery images must pass the relevance filter on their alt text
/// plus the source's label and category.
pub fn extract_page(
    page: &str,
    source: &SourceDescriptor,
    relevance: &RelevanceFilter,
    scraped_at: DateTime<Utc>,
) -> Vec<CandidateImage> {
    let mut images: Vec<CandidateImage> = Vec::new();
    if source.quota == 0 {
        return images;
    }

    let document = Html::parse_document(page);

    if let Some(url) = html::preview_image(&document) {
        let title = html::page_title(&document).unwrap_or_else(|| source.label.clone());
        images.push(CandidateImage::new(source, url, &title, &source.endpoint, scraped_at));
    }

    let Ok(img) = Selector::parse("img") else {
        return images;
    };

    for element in document.select(&img) {
        if images.len() >= source.quota {
            break;
        }

        let Some(url) = html::image_source(&element, GALLERY_SRC_ATTRS) else {
            continue;
        };

        let alt = element.value().attr("alt").unwrap_or("").trim();
        let context = format!("{} {} {}", alt, source.label, source.category);
        if !relevance.is_relevant(&context) {
            continue;
        }

        let too_narrow = element
            .value()
            .attr("width")
            .and_then(html::parse_width)
            .is_some_and(|w| w < MIN_WIDTH_PX);
        if too_narrow {
            continue;
        }

        let title = if alt.is_empty() { source.label.as_str() } else { alt };
        let candidate = CandidateImage::new(source, url, title, &source.endpoint, scraped_at);
        if images.iter().any(|i| i.id == candidate.id) {
            continue;
        }
        images.push(candidate);
    }

    images
}
