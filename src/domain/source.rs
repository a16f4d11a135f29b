use std::fmt;

use serde::{Deserialize, Serialize};

/// How a source is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// RSS/Atom/JSON feed, images discovered per entry
    Feed,
    /// A single editorial page, images taken from its metadata and gallery
    Page,
}

/// Coarse signal grouping of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Trade and runway
    L1,
    /// Subculture
    L2,
    /// Market and culture
    L3,
    /// Competitor and retail
    L4,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::L1 => "L1",
            Layer::L2 => "L2",
            Layer::L3 => "L3",
            Layer::L4 => "L4",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub kind: SourceKind,
    pub endpoint: String,
    pub label: String,
    pub layer: Layer,
    pub category: String,
    #[serde(default = "default_quota")]
    pub quota: usize,
}

fn default_quota() -> usize {
    6
}

impl SourceDescriptor {
    pub fn feed(endpoint: &str, label: &str, layer: Layer, category: &str, quota: usize) -> Self {
        Self {
            kind: SourceKind::Feed,
            endpoint: endpoint.to_string(),
            label: label.to_string(),
            layer,
            category: category.to_string(),
            quota,
        }
    }

    pub fn page(endpoint: &str, label: &str, layer: Layer, category: &str, quota: usize) -> Self {
        Self {
            kind: SourceKind::Page,
            ..Self::feed(endpoint, label, layer, category, quota)
        }
    }
}
