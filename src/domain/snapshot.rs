use chrono::{DateTime, Utc};

use crate::domain::CandidateImage;

/// One immutable generation of the cached image set.
#[derive(Debug, Clone)]
pub struct Snapshot {
    images: Vec<CandidateImage>,
    built_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(images: Vec<CandidateImage>, built_at: DateTime<Utc>) -> Self {
        Self { images, built_at }
    }

    pub fn images(&self) -> &[CandidateImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}
