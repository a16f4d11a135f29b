use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::Snapshot;

/// Holds the published snapshot. Readers get a shared handle to one whole
/// generation; publishing swaps the handle.
#[derive(Default)]
pub struct CacheStore {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The published snapshot, or `None` before the first build completes.
    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }

    pub async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = Some(snapshot.clone());
        snapshot
    }
}
