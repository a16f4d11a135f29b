use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::Semaphore;

use crate::app::{Result, SwipeError};
use crate::domain::{CandidateImage, Snapshot, SourceDescriptor};
use crate::extract::Extractor;

pub const DEFAULT_WORKERS: usize = 4;

/// Something that can produce a complete snapshot. Never fails: the worst
/// outcome is an empty snapshot.
#[async_trait]
pub trait SnapshotBuilder: Send + Sync {
    async fn build(&self) -> Snapshot;
}

/// One full pass over the source registry.
pub struct CacheBuilder {
    sources: Arc<Vec<SourceDescriptor>>,
    extractor: Arc<dyn Extractor>,
    semaphore: Arc<Semaphore>,
    max_images: usize,
    politeness_ms: (u64, u64),
}

impl CacheBuilder {
    pub fn new(
        sources: Arc<Vec<SourceDescriptor>>,
        extractor: Arc<dyn Extractor>,
        max_images: usize,
    ) -> Self {
        Self {
            sources,
            extractor,
            semaphore: Arc::new(Semaphore::new(DEFAULT_WORKERS)),
            max_images,
            politeness_ms: (500, 1500),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(workers.max(1)));
        self
    }

    /// Random pause bounds applied after each source, in milliseconds.
    pub fn with_politeness(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.politeness_ms = (min_ms.min(max_ms), min_ms.max(max_ms));
        self
    }

    /// Run every source on the worker pool. Results come back in registry order.
    async fn extract_all(&self) -> Vec<(String, Result<Vec<CandidateImage>>)> {
        let mut handles = Vec::new();

        for source in self.sources.iter().cloned() {
            let extractor = self.extractor.clone();
            let semaphore = self.semaphore.clone();
            let politeness_ms = self.politeness_ms;

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (source.label, Err(SwipeError::Other("worker pool closed".into())));
                };

                let result = extractor.extract(&source).await;

                // Hold the worker slot during the pause so sources stay spaced out
                tokio::time::sleep(politeness_pause(politeness_ms)).await;
                (source.label, result)
            });

            handles.push(handle);
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        results
    }
}

#[async_trait]
impl SnapshotBuilder for CacheBuilder {
    async fn build(&self) -> Snapshot {
        let started = Instant::now();
        tracing::info!(sources = self.sources.len(), "Starting snapshot build");

        let results = self.extract_all().await;
        let (mut images, failed) = merge_unique(results);
        let harvested = images.len();

        images.shuffle(&mut rand::rng());
        images.truncate(self.max_images);

        tracing::info!(
            harvested,
            kept = images.len(),
            failed_sources = failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Snapshot built"
        );

        Snapshot::new(images, Utc::now())
    }
}

/// Concatenate per-source results in order, dropping any image whose id was
/// already produced by an earlier source. Failed sources are logged and
/// counted.
pub fn merge_unique(
    results: Vec<(String, Result<Vec<CandidateImage>>)>,
) -> (Vec<CandidateImage>, usize) {
    let mut seen = HashSet::new();
    let mut images = Vec::new();
    let mut failed = 0;

    for (label, result) in results {
        match result {
            Ok(batch) => {
                for image in batch {
                    if seen.insert(image.id.clone()) {
                        images.push(image);
                    }
                }
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(source = %label, error = %e, "Source failed; skipping");
            }
        }
    }

    (images, failed)
}

fn politeness_pause((min_ms, max_ms): (u64, u64)) -> Duration {
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
}
