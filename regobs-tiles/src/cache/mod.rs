//! Offline tile storage and write deduplication.
//!
//! - [`TileStore`]: async get/put contract for durable tile storage
//! - [`providers`]: memory and disk stores
//! - [`clients`]: the tolerant client the tile layer talks to
//! - [`RecencyCache`]: bounded LRU set of recently persisted ids

pub mod clients;
pub mod providers;
mod recency;
mod traits;

pub use clients::TileStoreClient;
pub use providers::{clear_disk_store, disk_store_stats, DiskStoreStats, DiskTileStore, MemoryTileStore};
pub use recency::{RecencyCache, DEFAULT_RECENCY_CAPACITY};
pub use traits::{BoxFuture, StoreError, TileRecord, TileStore};
