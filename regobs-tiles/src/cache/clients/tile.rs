//! Offline tile store client used by the tile layer.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::traits::{TileRecord, TileStore};
use crate::coord::TileId;

/// Store client that never propagates store errors.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct TileStoreClient {
    store: Arc<dyn TileStore>,
}

impl TileStoreClient {
    /// Wrap a store.
    pub fn new(store: Arc<dyn TileStore>) -> Self {
        Self { store }
    }

    /// Look up a stored tile.
    ///
    /// Store failures are logged and reported as absent.
    pub async fn lookup(&self, id: &TileId) -> Option<TileRecord> {
        match self.store.get(id).await {
            Ok(Some(record)) => {
                debug!(id = %id, store = self.store.name(), "Offline tile hit");
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, id = %id, store = self.store.name(), "Offline tile lookup failed");
                None
            }
        }
    }

    /// Persist image bytes for a tile.
    ///
    /// Returns `true` if the store accepted the write. Failures are logged.
    pub async fn save(&self, id: &TileId, image_data: Vec<u8>) -> bool {
        match self.store.put(id, image_data).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, id = %id, store = self.store.name(), "Offline tile save failed");
                false
            }
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn TileStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::providers::MemoryTileStore;
    use crate::cache::traits::{BoxFuture, StoreError};
    use crate::coord::{compute_tile_id, TileCoord};

    /// Store whose backend is always unreachable.
    struct UnavailableStore;

    impl TileStore for UnavailableStore {
        fn get(&self, _id: &TileId) -> BoxFuture<'_, Result<Option<TileRecord>, StoreError>> {
            Box::pin(async { Err(StoreError::Unavailable("offline".to_string())) })
        }

        fn put(&self, _id: &TileId, _data: Vec<u8>) -> BoxFuture<'_, Result<(), StoreError>> {
            Box::pin(async { Err(StoreError::Unavailable("offline".to_string())) })
        }

        fn name(&self) -> &str {
            "unavailable"
        }
    }

    fn tile_id() -> TileId {
        compute_tile_id("base", &TileCoord::new(5, 10, 12).unwrap())
    }

    #[tokio::test]
    async fn test_client_save_and_lookup() {
        let client = TileStoreClient::new(Arc::new(MemoryTileStore::new(1_000_000)));

        assert!(client.save(&tile_id(), vec![1, 2]).await);
        let record = client.lookup(&tile_id()).await.unwrap();
        assert_eq!(record.image_data, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_client_lookup_missing() {
        let client = TileStoreClient::new(Arc::new(MemoryTileStore::new(1_000_000)));
        assert!(client.lookup(&tile_id()).await.is_none());
    }

    #[tokio::test]
    async fn test_client_unavailable_store_is_not_found() {
        let client = TileStoreClient::new(Arc::new(UnavailableStore));

        assert!(client.lookup(&tile_id()).await.is_none());
        assert!(!client.save(&tile_id(), vec![1]).await);
        assert_eq!(client.store().name(), "unavailable");
    }
}
