use serde::Serialize;

use crate::domain::CandidateImage;

pub const DEFAULT_MAX_BATCH: usize = 100;

/// One page of images plus the cursor for the next request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub images: Vec<CandidateImage>,
    pub total: usize,
    pub offset: usize,
    pub next_offset: usize,
}

impl Batch {
    fn empty() -> Self {
        Self {
            images: Vec::new(),
            total: 0,
            offset: 0,
            next_offset: 0,
        }
    }
}

/// Cyclic pagination over a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct BatchServer {
    max_count: usize,
}

impl Default for BatchServer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BATCH)
    }
}

impl BatchServer {
    pub fn new(max_count: usize) -> Self {
        Self { max_count }
    }

    /// Take up to `count` images starting at `offset`, wrapping to the start
    /// when the end is reached. An offset past the end starts over at 0.
    /// The wrapped part is at most one full pass over the view, so a batch
    /// larger than the view can repeat images.
    ///
    /// With `layer` set, paging runs over the images carrying that tag only;
    /// an unknown tag matches nothing.
    pub fn page(
        &self,
        images: &[CandidateImage],
        count: usize,
        offset: usize,
        layer: Option<&str>,
    ) -> Batch {
        let view: Vec<&CandidateImage> = match layer {
            Some(tag) => images.iter().filter(|i| i.layer_tag.as_str() == tag).collect(),
            None => images.iter().collect(),
        };

        let total = view.len();
        if total == 0 {
            return Batch::empty();
        }

        let count = count.min(self.max_count);
        let offset = if offset >= total { 0 } else { offset };

        let end = (offset + count).min(total);
        let mut batch: Vec<CandidateImage> =
            view[offset..end].iter().map(|i| (*i).clone()).collect();

        if batch.len() < count {
            let wrapped = (count - batch.len()).min(total);
            batch.extend(view[..wrapped].iter().map(|i| (*i).clone()));
        }

        Batch {
            images: batch,
            total,
            offset,
            next_offset: (offset + count) % total,
        }
    }
}
