use chrono::{DateTime, Utc};
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{Result, SwipeError};
use crate::extract::html;

/// A linked file declared on an entry, with its MIME type when one is given.
#[derive(Debug, Clone, PartialEq)]
pub struct Enclosure {
    pub href: String,
    pub media_type: Option<String>,
}

impl Enclosure {
    pub fn untyped(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            media_type: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.media_type
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains("image"))
    }

    /// True unless a declared type rules out an image.
    pub fn may_be_image(&self) -> bool {
        self.media_type.is_none() || self.is_image()
    }
}

/// The parts of a feed entry the image pipeline looks at.
#[derive(Debug, Clone, Default)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Media attachments (media:content, RSS enclosures, thumbnails), in order.
    pub media: Vec<Enclosure>,
    pub enclosures: Vec<Enclosure>,
}

impl FeedEntry {
    /// Title plus tag-stripped summary, used for the relevance check.
    pub fn context_text(&self) -> String {
        let body = self
            .summary
            .as_deref()
            .or(self.content.as_deref())
            .map(html::strip_tags)
            .unwrap_or_default();
        format!("{} {}", self.title, body)
    }

    /// Summary and body HTML concatenated, for inline image discovery.
    pub fn html(&self) -> String {
        let mut html = self.summary.clone().unwrap_or_default();
        if let Some(content) = &self.content {
            html.push_str(content);
        }
        html
    }

    pub fn is_older_than(&self, cutoff: DateTime<Utc>) -> bool {
        self.published_at.is_some_and(|p| p < cutoff)
    }
}

/// Parse an RSS/Atom/JSON feed body into entries, in feed order.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = parser::parse(body).map_err(|e| SwipeError::FeedParse(e.to_string()))?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let media = entry
                .media
                .iter()
                .flat_map(|object| {
                    let contents = object.content.iter().filter_map(|c| {
                        c.url.as_ref().map(|u| Enclosure {
                            href: u.to_string(),
                            media_type: c.content_type.as_ref().map(|m| m.to_string()),
                        })
                    });
                    let thumbnails = object
                        .thumbnails
                        .iter()
                        .map(|t| Enclosure::untyped(t.image.uri.clone()));
                    contents.chain(thumbnails).collect::<Vec<_>>()
                })
                .collect();

            let enclosures = entry
                .links
                .iter()
                .filter(|l| l.rel.as_deref() == Some("enclosure"))
                .map(|l| Enclosure {
                    href: l.href.clone(),
                    media_type: l.media_type.clone(),
                })
                .collect();

            let link = entry
                .links
                .iter()
                .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
                .map(|l| l.href.clone());

            FeedEntry {
                title: entry
                    .title
                    .map(|t| decode_html_entities(&t.content).trim().to_string())
                    .unwrap_or_default(),
                link,
                summary: entry.summary.map(|s| s.content),
                content: entry.content.and_then(|c| c.body),
                published_at: entry.published.or(entry.updated),
                media,
                enclosures,
            }
        })
        .collect();

    Ok(entries)
}
