//! In-memory tile store using moka.
//!
//! Useful for tests, for sessions without writable storage, and as the
//! store behind a layer that should not outlive the process. Entries are
//! weighted by image size and evicted automatically once the configured
//! byte limit is reached.

use std::sync::Arc;

use moka::future::Cache as MokaCache;

use crate::cache::traits::{BoxFuture, StoreError, TileRecord, TileStore};
use crate::coord::TileId;

/// In-memory offline tile store.
pub struct MemoryTileStore {
    cache: MokaCache<TileId, Arc<TileRecord>>,
    max_size_bytes: u64,
}

impl MemoryTileStore {
    /// Create a store bounded to `max_size_bytes` of image data.
    pub fn new(max_size_bytes: u64) -> Self {
        let cache = MokaCache::builder()
            // Weight each entry by its image size
            .weigher(|_key: &TileId, value: &Arc<TileRecord>| -> u32 {
                // moka uses u32 for weights, cap at u32::MAX for very large entries
                value.image_data.len().min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes)
            .build();

        Self {
            cache,
            max_size_bytes,
        }
    }

    /// Number of stored tiles.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Total stored image bytes.
    pub fn size_bytes(&self) -> u64 {
        self.cache.weighted_size()
    }

    /// Configured size limit.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Run moka's pending maintenance so counters are current.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl TileStore for MemoryTileStore {
    fn get(&self, id: &TileId) -> BoxFuture<'_, Result<Option<TileRecord>, StoreError>> {
        let id = id.clone();
        Box::pin(async move { Ok(self.cache.get(&id).await.map(|r| (*r).clone())) })
    }

    fn put(&self, id: &TileId, image_data: Vec<u8>) -> BoxFuture<'_, Result<(), StoreError>> {
        let id = id.clone();
        Box::pin(async move {
            // First write wins; records are never mutated in place
            if !self.cache.contains_key(&id) {
                let record = TileRecord::new(id.clone(), image_data);
                self.cache.insert(id, Arc::new(record)).await;
            }
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{compute_tile_id, TileCoord};

    fn id(layer: &str, z: u8, x: u32, y: u32) -> TileId {
        compute_tile_id(layer, &TileCoord::new(z, x, y).unwrap())
    }

    #[tokio::test]
    async fn test_memory_store_put_and_get() {
        let store = MemoryTileStore::new(1_000_000);
        let tile = id("base", 5, 10, 12);

        store.put(&tile, vec![1, 2, 3]).await.unwrap();

        let record = store.get(&tile).await.unwrap().unwrap();
        assert_eq!(record.id, tile);
        assert_eq!(record.image_data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_memory_store_get_missing() {
        let store = MemoryTileStore::new(1_000_000);
        let result = store.get(&id("base", 1, 0, 0)).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_memory_store_second_put_is_noop() {
        let store = MemoryTileStore::new(1_000_000);
        let tile = id("base", 5, 10, 12);

        store.put(&tile, vec![1]).await.unwrap();
        let first = store.get(&tile).await.unwrap().unwrap();

        store.put(&tile, vec![2, 2]).await.unwrap();
        let second = store.get(&tile).await.unwrap().unwrap();

        assert_eq!(second.image_data, vec![1]);
        assert_eq!(second.stored_at, first.stored_at);
    }

    #[tokio::test]
    async fn test_memory_store_layers_are_separate() {
        let store = MemoryTileStore::new(1_000_000);
        store.put(&id("base", 5, 10, 12), vec![1]).await.unwrap();

        assert!(store.get(&id("topo", 5, 10, 12)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_counters() {
        let store = MemoryTileStore::new(1_000_000);
        store.put(&id("base", 2, 0, 0), vec![0; 100]).await.unwrap();
        store.put(&id("base", 2, 1, 0), vec![0; 50]).await.unwrap();
        store.sync().await;

        assert_eq!(store.entry_count(), 2);
        assert_eq!(store.size_bytes(), 150);
        assert_eq!(store.max_size_bytes(), 1_000_000);
    }
}
