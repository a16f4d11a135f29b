//! Refresh policy for the shared snapshot.
//!
//! At most one build runs at a time. Callers that ask for a refresh while a
//! build is running join it instead of starting another. Only the very first
//! reader ever waits on a build; after that readers always get the current
//! snapshot and staleness is handled in the background.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::cache::builder::SnapshotBuilder;
use crate::cache::store::CacheStore;
use crate::config::CacheConfig;
use crate::domain::Snapshot;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshPolicy {
    /// Age after which a snapshot is considered stale.
    pub interval: Duration,
    /// How long the first reader waits for the initial build.
    pub first_fill_timeout: Duration,
}

impl From<&CacheConfig> for RefreshPolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            interval: config.refresh_interval(),
            first_fill_timeout: config.first_fill_timeout(),
        }
    }
}

/// A handle on one build. Cloning it shares the same outcome.
#[derive(Clone)]
pub struct BuildHandle {
    rx: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl BuildHandle {
    /// Finished, or abandoned because the build task went away.
    fn is_settled(&self) -> bool {
        self.rx.borrow().is_some() || self.rx.has_changed().is_err()
    }

    /// Wait for the published snapshot. `None` if the build task died.
    pub async fn wait(mut self) -> Option<Arc<Snapshot>> {
        let outcome = self.rx.wait_for(|s| s.is_some()).await;
        outcome.ok().and_then(|published| published.clone())
    }
}

struct InFlight {
    generation: u64,
    handle: BuildHandle,
}

pub struct Refresher {
    store: Arc<CacheStore>,
    builder: Arc<dyn SnapshotBuilder>,
    clock: Arc<dyn Clock>,
    policy: RefreshPolicy,
    in_flight: Arc<Mutex<Option<InFlight>>>,
    generation: AtomicU64,
}

impl Refresher {
    pub fn new(
        store: Arc<CacheStore>,
        builder: Arc<dyn SnapshotBuilder>,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            store,
            builder,
            clock: Arc::new(SystemClock),
            policy,
            in_flight: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start a build, or join the one already running.
    pub async fn trigger(&self) -> BuildHandle {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(running) = in_flight.as_ref() {
            if !running.handle.is_settled() {
                tracing::debug!(generation = running.generation, "Joining build in progress");
                return running.handle.clone();
            }
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = watch::channel(None);
        let handle = BuildHandle { rx };
        *in_flight = Some(InFlight {
            generation,
            handle: handle.clone(),
        });
        drop(in_flight);

        tracing::info!(generation, "Snapshot build started");

        let store = self.store.clone();
        let builder = self.builder.clone();
        let slot = self.in_flight.clone();
        tokio::spawn(async move {
            let snapshot = builder.build().await;
            let published = store.publish(snapshot).await;
            tracing::info!(generation, images = published.len(), "Snapshot published");
            tx.send_replace(Some(published));

            let mut in_flight = slot.lock().await;
            if in_flight.as_ref().is_some_and(|f| f.generation == generation) {
                *in_flight = None;
            }
        });

        handle
    }

    /// Explicit refresh request; never blocks on the build.
    pub async fn force_refresh(&self) -> BuildHandle {
        self.trigger().await
    }

    /// The build currently running, if any.
    pub async fn pending(&self) -> Option<BuildHandle> {
        let in_flight = self.in_flight.lock().await;
        in_flight
            .as_ref()
            .map(|f| f.handle.clone())
            .filter(|h| !h.is_settled())
    }

    /// Start a background build when nothing is published yet or the
    /// published snapshot is stale. Returns whether a build was requested.
    pub async fn refresh_if_stale(&self) -> bool {
        let needs_build = match self.store.current().await {
            Some(current) => self.is_stale(&current),
            None => true,
        };
        if needs_build {
            self.trigger().await;
        }
        needs_build
    }

    /// The snapshot to serve right now.
    ///
    /// With nothing published yet this waits up to the first-fill timeout and
    /// returns `None` if the build has not published by then. Otherwise it
    /// returns immediately, kicking off a background rebuild if the current
    /// snapshot is stale or empty.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        if let Some(current) = self.store.current().await {
            if self.is_stale(&current) {
                self.trigger().await;
            }
            return Some(current);
        }

        let handle = self.trigger().await;
        match tokio::time::timeout(self.policy.first_fill_timeout, handle.wait()).await {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => {
                tracing::warn!("Initial build ended without publishing");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.policy.first_fill_timeout.as_secs(),
                    "Initial build still running"
                );
                None
            }
        }
    }

    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.store.current().await
    }

    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.store.current().await.map(|s| s.built_at())
    }

    pub fn next_refresh_after(&self, last: DateTime<Utc>) -> Option<DateTime<Utc>> {
        chrono::Duration::from_std(self.policy.interval)
            .ok()
            .and_then(|interval| last.checked_add_signed(interval))
    }

    fn is_stale(&self, snapshot: &Snapshot) -> bool {
        if snapshot.is_empty() {
            return true;
        }
        (self.clock.now() - snapshot.built_at())
            .to_std()
            .is_ok_and(|age| age > self.policy.interval)
    }

    /// Periodically rebuild once the snapshot has aged past the interval.
    pub fn spawn_staleness_check(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let refresher = self.clone();
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(every);
            timer.tick().await; // Skip the first immediate tick

            loop {
                timer.tick().await;
                if refresher.refresh_if_stale().await {
                    tracing::info!("Snapshot stale; scheduled rebuild requested");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CandidateImage, Layer, SourceDescriptor};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    struct ManualClock(std::sync::Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(std::sync::Mutex::new(Utc::now())))
        }

        fn advance(&self, by: chrono::Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Counts builds; a gated builder blocks each build until released.
    struct FakeBuilder {
        builds: AtomicUsize,
        images: usize,
        gate: Option<Notify>,
    }

    impl FakeBuilder {
        fn new(images: usize) -> Arc<Self> {
            Arc::new(Self {
                builds: AtomicUsize::new(0),
                images,
                gate: None,
            })
        }

        fn gated(images: usize) -> Arc<Self> {
            Arc::new(Self {
                builds: AtomicUsize::new(0),
                images,
                gate: Some(Notify::new()),
            })
        }

        fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.notify_one();
            }
        }

        fn builds(&self) -> usize {
            self.builds.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SnapshotBuilder for FakeBuilder {
        async fn build(&self) -> Snapshot {
            let n = self.builds.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let source = SourceDescriptor::feed(
                "https://example.com/feed",
                "Example",
                Layer::L1,
                "Test",
                8,
            );
            let images = (0..self.images)
                .map(|i| {
                    CandidateImage::new(
                        &source,
                        format!("https://cdn.example.com/{n}/{i}.jpg"),
                        "Tee",
                        "https://example.com",
                        Utc::now(),
                    )
                })
                .collect();
            Snapshot::new(images, Utc::now())
        }
    }

    fn policy() -> RefreshPolicy {
        RefreshPolicy {
            interval: Duration::from_secs(6 * 3600),
            first_fill_timeout: Duration::from_secs(5),
        }
    }

    fn refresher(builder: Arc<FakeBuilder>, clock: Arc<ManualClock>) -> Arc<Refresher> {
        Arc::new(Refresher::new(Arc::new(CacheStore::new()), builder, policy()).with_clock(clock))
    }

    #[tokio::test]
    async fn test_first_reader_waits_for_initial_build() {
        let builder = FakeBuilder::new(3);
        let refresher = refresher(builder.clone(), ManualClock::new());

        let snapshot = refresher.snapshot().await.unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(builder.builds(), 1);
        assert!(refresher.last_refresh().await.is_some());
    }

    #[tokio::test]
    async fn test_fresh_snapshot_served_without_rebuild() {
        let builder = FakeBuilder::new(3);
        let refresher = refresher(builder.clone(), ManualClock::new());

        let first = refresher.snapshot().await.unwrap();
        let second = refresher.snapshot().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builder.builds(), 1);
        assert!(refresher.pending().await.is_none());
        assert!(!refresher.refresh_if_stale().await);
    }

    #[tokio::test]
    async fn test_stale_snapshot_served_while_rebuilding() {
        let builder = FakeBuilder::gated(3);
        let clock = ManualClock::new();
        let refresher = refresher(builder.clone(), clock.clone());

        builder.release();
        let first = refresher.snapshot().await.unwrap();

        clock.advance(chrono::Duration::hours(7));
        let served = refresher.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&first, &served));

        let pending = refresher.pending().await.expect("rebuild should be running");
        builder.release();
        let rebuilt = pending.wait().await.unwrap();

        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(builder.builds(), 2);
        assert!(Arc::ptr_eq(&refresher.current().await.unwrap(), &rebuilt));
    }

    #[tokio::test]
    async fn test_empty_published_snapshot_triggers_background_rebuild() {
        let builder = FakeBuilder::gated(0);
        let refresher = refresher(builder.clone(), ManualClock::new());

        builder.release();
        assert!(refresher.snapshot().await.unwrap().is_empty());

        let served = refresher.snapshot().await.unwrap();
        assert!(served.is_empty());
        assert!(refresher.pending().await.is_some());
        builder.release();
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_share_one_build() {
        let builder = FakeBuilder::gated(2);
        let refresher = refresher(builder.clone(), ManualClock::new());

        let first = refresher.force_refresh().await;
        let second = refresher.force_refresh().await;
        builder.release();

        let a = first.wait().await.unwrap();
        let b = second.wait().await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(builder.builds(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_readers_share_one_build() {
        let builder = FakeBuilder::gated(2);
        let refresher = refresher(builder.clone(), ManualClock::new());

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let refresher = refresher.clone();
                tokio::spawn(async move { refresher.snapshot().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        builder.release();

        for reader in readers {
            assert_eq!(reader.await.unwrap().unwrap().len(), 2);
        }
        assert_eq!(builder.builds(), 1);
    }

    #[tokio::test]
    async fn test_new_build_after_previous_finished() {
        let builder = FakeBuilder::new(1);
        let refresher = refresher(builder.clone(), ManualClock::new());

        refresher.force_refresh().await.wait().await.unwrap();
        refresher.force_refresh().await.wait().await.unwrap();

        assert_eq!(builder.builds(), 2);
    }

    #[tokio::test]
    async fn test_first_fill_timeout_returns_nothing() {
        let builder = FakeBuilder::gated(3);
        let store = Arc::new(CacheStore::new());
        let refresher = Refresher::new(
            store.clone(),
            builder.clone(),
            RefreshPolicy {
                interval: Duration::from_secs(3600),
                first_fill_timeout: Duration::from_millis(50),
            },
        );

        let snapshot = refresher.snapshot().await;

        assert!(snapshot.is_none());
        assert!(refresher.last_refresh().await.is_none());
        assert!(store.current().await.is_none());
        assert!(refresher.pending().await.is_some());
        builder.release();
    }

    #[tokio::test]
    async fn test_refresh_if_stale_when_nothing_published() {
        let builder = FakeBuilder::new(1);
        let refresher = refresher(builder.clone(), ManualClock::new());

        assert!(refresher.refresh_if_stale().await);
    }

    #[test]
    fn test_next_refresh_is_interval_after_last() {
        let refresher = Refresher::new(Arc::new(CacheStore::new()), FakeBuilder::new(0), policy());
        let last = Utc::now();
        assert_eq!(refresher.next_refresh_after(last), Some(last + chrono::Duration::hours(6)));
    }
}
