//! Tile loading errors.
//!
//! None of these reach the user as a failure of the map: network and store
//! errors are recovered by the fallback chain, an exhausted chain leaves a
//! blank tile. Coordinate and geometry errors are configuration mistakes
//! reported when a layer or tile is created.

use thiserror::Error;

use crate::cache::StoreError;
use crate::coord::{CoordError, TileId};
use crate::exclusion::GeometryError;
use crate::provider::ProviderError;

/// Errors in the life of a tile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TileError {
    /// The tile could not be fetched from its server.
    #[error("network fetch failed for {url}: {reason}")]
    NetworkFetchFailed { url: String, reason: String },

    /// The offline store could not be reached.
    #[error("offline store unavailable: {0}")]
    StoreUnavailable(String),

    /// Every fallback was tried without producing an image.
    #[error("no fallback left for tile {tile} after {attempts} ancestor attempts")]
    FallbackExhausted { tile: TileId, attempts: u8 },

    /// Tile coordinate outside the grid.
    #[error("invalid tile coordinate: {0}")]
    InvalidTileCoordinate(#[from] CoordError),

    /// Exclusion region could not be built.
    #[error("invalid exclusion geometry: {0}")]
    InvalidExclusionGeometry(#[from] GeometryError),

    /// Payload is not a displayable raster.
    #[error("image from {origin} could not be decoded: {reason}")]
    ImageDecode { origin: String, reason: String },
}

impl TileError {
    /// Wrap a provider error for `url`.
    pub fn network(url: &str, error: ProviderError) -> Self {
        TileError::NetworkFetchFailed {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<StoreError> for TileError {
    fn from(error: StoreError) -> Self {
        TileError::StoreUnavailable(error.to_string())
    }
}
