//! Session-scoped recency cache of persisted tile ids.
//!
//! Remembers which tiles were handed to the offline store recently so the
//! same tile is not encoded and written again while it stays on screen or
//! is re-requested by an overlapping layer. It is a deduplication hint only:
//! nothing survives a restart and the store remains the source of truth.
//!
//! Eviction is exact LRU (via the `lru` crate) rather than moka's
//! frequency-based admission: after `capacity + 1` distinct inserts the
//! least recently used id, and only that id, is gone.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::coord::TileId;

/// Default number of ids remembered.
pub const DEFAULT_RECENCY_CAPACITY: usize = 2000;

/// Bounded LRU set of recently persisted tile ids.
///
/// Shared between layers as `Arc<RecencyCache>`. The lock is held only for
/// the duration of a single hash-map operation.
pub struct RecencyCache {
    inner: Mutex<LruCache<TileId, ()>>,
}

impl RecencyCache {
    /// Create a cache holding at most `capacity` ids (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Whether `id` was marked saved recently.
    ///
    /// Does not change recency order.
    pub fn has(&self, id: &TileId) -> bool {
        self.inner.lock().contains(id)
    }

    /// Mark `id` as the most recently saved tile.
    ///
    /// Evicts the least recently used id when full. Re-marking an id that is
    /// already present only refreshes its position.
    pub fn mark_saved(&self, id: TileId) {
        self.inner.lock().put(id, ());
    }

    /// Mark `id` saved unless it already is, as one atomic step.
    ///
    /// Returns `true` if the caller should go on and persist the tile.
    /// An id already present is left where it is in the recency order.
    pub fn mark_if_absent(&self, id: &TileId) -> bool {
        let mut inner = self.inner.lock();
        if inner.contains(id) {
            return false;
        }
        inner.put(id.clone(), ());
        true
    }

    /// Drop `id`, e.g. when its write could not even be queued.
    pub fn forget(&self, id: &TileId) {
        self.inner.lock().pop(id);
    }

    /// Number of ids currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache holds no ids.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }
}

impl Default for RecencyCache {
    fn default() -> Self {
        Self::new(DEFAULT_RECENCY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{compute_tile_id, TileCoord};

    fn id(n: u32) -> TileId {
        compute_tile_id("base", &TileCoord::new(18, n, 0).unwrap())
    }

    #[test]
    fn test_default_capacity() {
        let cache = RecencyCache::default();
        assert_eq!(cache.capacity(), 2000);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_mark_and_has() {
        let cache = RecencyCache::new(4);
        assert!(!cache.has(&id(1)));
        cache.mark_saved(id(1));
        assert!(cache.has(&id(1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_exactly_least_recent() {
        let capacity = 100;
        let cache = RecencyCache::new(capacity);
        for n in 0..=capacity as u32 {
            cache.mark_saved(id(n));
        }

        assert_eq!(cache.len(), capacity);
        assert!(!cache.has(&id(0)), "oldest id should be evicted");
        for n in 1..=capacity as u32 {
            assert!(cache.has(&id(n)), "id {} should remain", n);
        }
    }

    #[test]
    fn test_mark_existing_refreshes_recency() {
        let cache = RecencyCache::new(3);
        cache.mark_saved(id(1));
        cache.mark_saved(id(2));
        cache.mark_saved(id(3));

        // Refresh 1, so 2 becomes least recent
        cache.mark_saved(id(1));
        cache.mark_saved(id(4));

        assert!(cache.has(&id(1)));
        assert!(!cache.has(&id(2)));
        assert!(cache.has(&id(3)));
        assert!(cache.has(&id(4)));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_has_does_not_refresh() {
        let cache = RecencyCache::new(2);
        cache.mark_saved(id(1));
        cache.mark_saved(id(2));
        assert!(cache.has(&id(1)));
        cache.mark_saved(id(3));
        assert!(!cache.has(&id(1)));
    }

    #[test]
    fn test_mark_if_absent() {
        let cache = RecencyCache::new(4);
        assert!(cache.mark_if_absent(&id(1)));
        assert!(!cache.mark_if_absent(&id(1)));
        assert!(cache.has(&id(1)));
    }

    #[test]
    fn test_forget() {
        let cache = RecencyCache::new(4);
        cache.mark_saved(id(1));
        cache.forget(&id(1));
        assert!(!cache.has(&id(1)));
        assert!(cache.mark_if_absent(&id(1)));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let cache = RecencyCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.mark_saved(id(1));
        cache.mark_saved(id(2));
        assert_eq!(cache.len(), 1);
        assert!(cache.has(&id(2)));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let cache = RecencyCache::new(16);
        for n in 0..1000 {
            cache.mark_saved(id(n % 64));
            assert!(cache.len() <= 16);
        }
    }
}
