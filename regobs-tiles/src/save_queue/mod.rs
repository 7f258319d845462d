//! Opportunistic persistence of displayed tiles.
//!
//! When a tile is displayed from the network the layer offers it here.
//! [`SaveQueue::offer`] decides synchronously, without blocking the render
//! path, whether the tile becomes a write:
//!
//! ```text
//! offer(id, source, image)
//!    │
//!    ├─ source not http(s) ──────────► NotNetworkOrigin
//!    ├─ id in RecencyCache ──────────► RecentlySaved
//!    ├─ mark id in RecencyCache
//!    └─ try_send to worker ──────────► Queued | QueueFull | QueueClosed
//!
//! worker: recv up to batch_size ─► encode ─► store.put ─► sleep(throttle)
//! ```
//!
//! The id is marked before the write completes so overlapping requests for
//! the same tile never produce a second write. Write failures are logged
//! and counted, never surfaced; a failed id is unmarked so the next display
//! of the tile offers it again.

mod worker;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::cache::{RecencyCache, TileStoreClient};
use crate::coord::TileId;

/// Default pause between write batches, in milliseconds.
pub const DEFAULT_SAVE_THROTTLE_MS: u64 = 50;

/// Default number of writes per batch.
pub const DEFAULT_SAVE_BATCH_SIZE: usize = 32;

/// Default capacity of the pending-write channel.
pub const DEFAULT_SAVE_CHANNEL_CAPACITY: usize = 1000;

/// Encoding of persisted tile images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileImageFormat {
    /// Lossless; keeps transparency.
    #[default]
    Png,
    /// Smaller records; transparency is flattened.
    Jpeg,
}

impl TileImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TileImageFormat::Png => "png",
            TileImageFormat::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for TileImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TileImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" | "image/png" => Ok(TileImageFormat::Png),
            "jpeg" | "jpg" | "image/jpeg" => Ok(TileImageFormat::Jpeg),
            other => Err(format!("unknown image format '{}'", other)),
        }
    }
}

/// Save queue configuration.
#[derive(Clone, Debug)]
pub struct SaveQueueConfig {
    /// Pause after each batch.
    pub throttle: Duration,
    /// Maximum writes per batch.
    pub batch_size: usize,
    /// Pending writes held before offers are dropped.
    pub channel_capacity: usize,
    /// Encoding of written records.
    pub image_format: TileImageFormat,
}

impl Default for SaveQueueConfig {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(DEFAULT_SAVE_THROTTLE_MS),
            batch_size: DEFAULT_SAVE_BATCH_SIZE,
            channel_capacity: DEFAULT_SAVE_CHANNEL_CAPACITY,
            image_format: TileImageFormat::default(),
        }
    }
}

/// Outcome of offering a tile for persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    /// Source was not fetched over the network.
    NotNetworkOrigin,
    /// Already persisted this session.
    RecentlySaved,
    /// Handed to the background writer.
    Queued,
    /// Writer is backed up; the tile was not queued.
    QueueFull,
    /// Writer has shut down.
    QueueClosed,
}

/// A pending write.
pub(crate) struct SaveRequest {
    pub id: TileId,
    pub image: Arc<DynamicImage>,
}

/// Counters shared with the worker.
#[derive(Debug, Default)]
pub(crate) struct SaveCounters {
    pub saved: AtomicU64,
    pub failed: AtomicU64,
}

/// Point-in-time save statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveQueueStats {
    /// Writes the store accepted.
    pub saved: u64,
    /// Writes that failed to encode or store.
    pub failed: u64,
}

/// Whether a tile source was fetched over the network.
pub fn is_network_source(source: &str) -> bool {
    source.starts_with("http")
}

/// Throttled background writer shared by all layers.
pub struct SaveQueue {
    recency: Arc<RecencyCache>,
    request_tx: mpsc::Sender<SaveRequest>,
    counters: Arc<SaveCounters>,
    shutdown: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SaveQueue {
    /// Start the queue and its worker on the current Tokio runtime.
    pub fn start(
        config: SaveQueueConfig,
        recency: Arc<RecencyCache>,
        store: TileStoreClient,
    ) -> Self {
        let (request_tx, request_rx) = mpsc::channel(config.channel_capacity.max(1));
        let counters = Arc::new(SaveCounters::default());
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(worker::run(
            request_rx,
            store,
            Arc::clone(&recency),
            config,
            Arc::clone(&counters),
            shutdown.clone(),
        ));

        Self {
            recency,
            request_tx,
            counters,
            shutdown,
            worker: Mutex::new(Some(handle)),
        }
    }

    /// Offer a displayed tile for persistence.
    ///
    /// `source` is where the displayed bytes came from; only `http(s)`
    /// sources are persisted.
    pub fn offer(&self, id: &TileId, source: &str, image: Arc<DynamicImage>) -> SaveDecision {
        if !is_network_source(source) {
            trace!(id = %id, "Skipping save of non-network tile");
            return SaveDecision::NotNetworkOrigin;
        }

        if !self.recency.mark_if_absent(id) {
            trace!(id = %id, "Tile saved recently, skipping");
            return SaveDecision::RecentlySaved;
        }

        let request = SaveRequest {
            id: id.clone(),
            image,
        };
        match self.request_tx.try_send(request) {
            Ok(()) => {
                debug!(id = %id, "Tile queued for offline save");
                SaveDecision::Queued
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.recency.forget(id);
                debug!(id = %id, "Save queue full, dropping tile");
                SaveDecision::QueueFull
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.recency.forget(id);
                SaveDecision::QueueClosed
            }
        }
    }

    /// The recency cache used for deduplication.
    pub fn recency(&self) -> &Arc<RecencyCache> {
        &self.recency
    }

    pub fn stats(&self) -> SaveQueueStats {
        SaveQueueStats {
            saved: self.counters.saved.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting work, write everything already queued, and wait for
    /// the worker to finish.
    ///
    /// Calling this more than once is harmless.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
            info!(
                saved = self.counters.saved.load(Ordering::Relaxed),
                failed = self.counters.failed.load(Ordering::Relaxed),
                "Save queue stopped"
            );
        }
    }
}

impl Drop for SaveQueue {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
