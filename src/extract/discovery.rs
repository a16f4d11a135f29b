//! Ordered image discovery for feed entries.
//!
//! Each strategy looks at one kind of hint and reports a URL only if it
//! survives normalization. The chain asks strategies in order and stops at
//! the first hit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::extract::entries::FeedEntry;
use crate::extract::html;
use crate::fetcher::Fetcher;
use crate::filter::normalize;

#[async_trait]
pub trait ImageStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn discover(&self, entry: &FeedEntry) -> Option<String>;
}

/// media:content, RSS enclosures and media thumbnails. Attachments typed as
/// something other than an image are skipped.
pub struct MediaAttachments;

#[async_trait]
impl ImageStrategy for MediaAttachments {
    fn name(&self) -> &'static str {
        "media"
    }

    async fn discover(&self, entry: &FeedEntry) -> Option<String> {
        entry
            .media
            .iter()
            .filter(|m| m.may_be_image())
            .find_map(|m| normalize(&m.href))
    }
}

/// Enclosure links whose declared type is an image.
pub struct ImageEnclosures;

#[async_trait]
impl ImageStrategy for ImageEnclosures {
    fn name(&self) -> &'static str {
        "enclosure"
    }

    async fn discover(&self, entry: &FeedEntry) -> Option<String> {
        entry
            .enclosures
            .iter()
            .filter(|e| e.is_image())
            .find_map(|e| normalize(&e.href))
    }
}

/// First `<img>` in the entry's summary or body.
pub struct InlineImage;

#[async_trait]
impl ImageStrategy for InlineImage {
    fn name(&self) -> &'static str {
        "inline"
    }

    async fn discover(&self, entry: &FeedEntry) -> Option<String> {
        html::first_image(&entry.html())
    }
}

/// Fetches the linked article and reads its social preview image.
///
/// Each instance allows a fixed number of fetches; once spent it reports
/// nothing, which bounds the network cost of a single feed.
pub struct ArticlePreview {
    fetcher: Arc<dyn Fetcher>,
    timeout: Duration,
    remaining: AtomicUsize,
}

impl ArticlePreview {
    pub fn new(fetcher: Arc<dyn Fetcher>, timeout: Duration, lookups: usize) -> Self {
        Self {
            fetcher,
            timeout,
            remaining: AtomicUsize::new(lookups),
        }
    }

    fn take_lookup(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ImageStrategy for ArticlePreview {
    fn name(&self) -> &'static str {
        "article"
    }

    async fn discover(&self, entry: &FeedEntry) -> Option<String> {
        let link = entry.link.as_deref()?;
        if !self.take_lookup() {
            return None;
        }

        match self.fetcher.fetch_text(link, self.timeout).await {
            Ok(page) => html::preview_image_of(&page),
            Err(e) => {
                tracing::debug!(url = link, error = %e, "Article lookup failed");
                None
            }
        }
    }
}

pub struct DiscoveryChain {
    strategies: Vec<Box<dyn ImageStrategy>>,
}

impl DiscoveryChain {
    pub fn new(strategies: Vec<Box<dyn ImageStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard chain for one feed: attachments, enclosures, inline
    /// markup, then a bounded number of article lookups.
    pub fn for_feed(fetcher: Arc<dyn Fetcher>, article_timeout: Duration, lookups: usize) -> Self {
        Self::new(vec![
            Box::new(MediaAttachments),
            Box::new(ImageEnclosures),
            Box::new(InlineImage),
            Box::new(ArticlePreview::new(fetcher, article_timeout, lookups)),
        ])
    }

    pub async fn discover(&self, entry: &FeedEntry) -> Option<String> {
        for strategy in &self.strategies {
            if let Some(url) = strategy.discover(entry).await {
                tracing::trace!(strategy = strategy.name(), %url, "Image discovered");
                return Some(url);
            }
        }
        None
    }
}
