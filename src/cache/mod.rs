//! The shared image cache: building snapshots, publishing them, keeping
//! them fresh and paging through them.

pub mod batch;
pub mod builder;
pub mod refresh;
pub mod store;

pub use batch::{Batch, BatchServer};
pub use builder::{CacheBuilder, SnapshotBuilder};
pub use refresh::{BuildHandle, Clock, RefreshPolicy, Refresher, SystemClock};
pub use store::CacheStore;
