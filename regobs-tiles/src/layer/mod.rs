//! The offline tile layer.
//!
//! [`OfflineTileLayer`] wraps a [`TileProvider`](crate::provider::TileProvider)
//! and adds what a map needs to keep working with a flaky or absent
//! network: exclusion of tiles covered elsewhere, persistence of displayed
//! tiles, offline store lookup and ancestor-zoom substitution.

pub mod grid;

mod event;
mod offline;
mod options;
mod stats;
mod tile;

pub use event::{FallbackSource, TilePhase, TileSubstituted};
pub use grid::TileRange;
pub use offline::{OfflineTileLayer, EVENT_CHANNEL_CAPACITY};
pub use options::{LayerOptions, DEFAULT_EDGE_BUFFER_TILES, DEFAULT_TILE_SIZE};
pub use stats::{LayerMetrics, LayerStatsSnapshot};
pub use tile::{LoadedTile, TileLoadOutcome, TileSource};
