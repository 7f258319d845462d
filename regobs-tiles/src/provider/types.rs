//! Provider types and traits

use std::fmt;
use std::future::Future;

use crate::coord::TileCoord;

/// Errors that can occur while fetching tiles.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed
    HttpError(String),
    /// Response received but unusable
    InvalidResponse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Capability a tile layer needs from its imagery source.
///
/// Covers URL generation, fetching and validity testing. The offline
/// layer wraps a provider and adds store lookups, persistence and
/// ancestor-zoom fallback on top.
///
/// # Implementors
///
/// - [`HttpTileProvider`](super::HttpTileProvider) - URL template + HTTP client
pub trait TileProvider: Send + Sync {
    /// URL of the given tile.
    fn tile_url(&self, coord: &TileCoord) -> String;

    /// Fetch the bytes at `url`.
    ///
    /// # Returns
    ///
    /// Raw image bytes (PNG/JPEG) or an error.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Whether the provider serves this tile at all.
    fn is_valid_tile(&self, coord: &TileCoord) -> bool;

    /// Lowest zoom the provider serves.
    fn min_zoom(&self) -> u8;

    /// Highest zoom the provider serves.
    fn max_zoom(&self) -> u8;

    /// Checks if the zoom level is served.
    fn supports_zoom(&self, zoom: u8) -> bool {
        zoom >= self.min_zoom() && zoom <= self.max_zoom()
    }
}
