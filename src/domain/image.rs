use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{Layer, SourceDescriptor};

/// Hex characters kept from the SHA-256 digest (64 bits).
const ID_LEN: usize = 16;

pub const MAX_TITLE_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateImage {
    pub id: String,
    pub image_url: String,
    pub title: String,
    pub source_label: String,
    pub layer_tag: Layer,
    pub category_label: String,
    pub origin_url: String,
    pub scraped_at: DateTime<Utc>,
}

impl CandidateImage {
    /// Build a candidate for an already normalized image URL.
    pub fn new(
        source: &SourceDescriptor,
        image_url: String,
        title: &str,
        origin_url: &str,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::identify(&image_url),
            image_url,
            title: truncate_title(title),
            source_label: source.label.clone(),
            layer_tag: source.layer,
            category_label: source.category.clone(),
            origin_url: origin_url.to_string(),
            scraped_at,
        }
    }

    /// Generate a deterministic ID from a normalized image URL
    pub fn identify(normalized_url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalized_url.as_bytes());
        let mut id = hex::encode(hasher.finalize());
        id.truncate(ID_LEN);
        id
    }
}

fn truncate_title(title: &str) -> String {
    title.trim().chars().take(MAX_TITLE_CHARS).collect()
}
