//! Offline tile store implementations.
//!
//! # Available Stores
//!
//! - [`MemoryTileStore`]: in-memory, size-bounded store using moka
//! - [`DiskTileStore`]: one file per tile under a cache directory
//!
//! Both implement [`TileStore`](crate::cache::TileStore) and are shared as
//! `Arc<dyn TileStore>`.

mod disk;
mod memory;

pub use disk::{clear_disk_store, disk_store_stats, DiskStoreStats, DiskTileStore};
pub use memory::MemoryTileStore;
