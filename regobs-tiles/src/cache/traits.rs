//! Offline tile store contract.
//!
//! The `TileStore` trait is the only thing the tile layer knows about
//! durable storage: look up a record by tile id and write image bytes for an
//! id. Backends may be in-memory, on-disk or an embedded database.
//!
//! # Contract
//!
//! - **Absence is not an error**: `get` returns `Ok(None)` for unknown ids.
//! - **Duplicate writes are harmless**: a `put` for an id that already
//!   exists may overwrite or do nothing. Callers avoid redundant writes by
//!   policy (the recency cache), never for correctness.
//! - **Failures are transient**: `StoreError` means the backend could not be
//!   reached. Callers degrade to "not found" and carry on.
//! - **Dyn-compatible**: methods return `Pin<Box<dyn Future>>` so stores can
//!   be shared as `Arc<dyn TileStore>`.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::TileId;

/// Errors raised by tile store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error reaching the backing storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be decoded.
    #[error("Corrupt record for {id}: {reason}")]
    Corrupt { id: String, reason: String },

    /// The store is not reachable (closed, shutting down, offline).
    #[error("Tile store unavailable: {0}")]
    Unavailable(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A tile persisted in the offline store.
///
/// Created on the first successful write for an id and never mutated in
/// place afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Identifier the record is stored under.
    pub id: TileId,
    /// Encoded image bytes in the configured tile format.
    pub image_data: Vec<u8>,
    /// When the record was first written.
    pub stored_at: DateTime<Utc>,
}

impl TileRecord {
    /// Create a record stamped with the current time.
    pub fn new(id: TileId, image_data: Vec<u8>) -> Self {
        Self {
            id,
            image_data,
            stored_at: Utc::now(),
        }
    }
}

/// Asynchronous key → image store for offline tiles.
///
/// Implementations must be `Send + Sync`; a single store is shared by every
/// tile and every layer instance.
pub trait TileStore: Send + Sync {
    /// Look up the record stored for `id`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if the id exists
    /// - `Ok(None)` if the id is not stored
    /// - `Err(_)` if the backend cannot be reached
    fn get(&self, id: &TileId) -> BoxFuture<'_, Result<Option<TileRecord>, StoreError>>;

    /// Store image bytes for `id`.
    ///
    /// Writing an id that already exists is permitted to be a no-op.
    fn put(&self, id: &TileId, image_data: Vec<u8>) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{compute_tile_id, TileCoord};

    #[test]
    fn test_record_new_stamps_time() {
        let before = Utc::now();
        let id = compute_tile_id("base", &TileCoord::new(1, 0, 0).unwrap());
        let record = TileRecord::new(id.clone(), vec![1, 2, 3]);
        assert_eq!(record.id, id);
        assert_eq!(record.image_data, vec![1, 2, 3]);
        assert!(record.stored_at >= before);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("closed".to_string());
        assert_eq!(err.to_string(), "Tile store unavailable: closed");

        let err = StoreError::Corrupt {
            id: "base_1_0_0".to_string(),
            reason: "truncated".to_string(),
        };
        assert!(err.to_string().contains("base_1_0_0"));
    }

    #[test]
    fn test_store_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
