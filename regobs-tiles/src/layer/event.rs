//! Notifications emitted by a layer.

use std::fmt;

use crate::coord::TileId;
use crate::fallback::TileStyle;

/// What a substituted tile is now showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackSource {
    /// Record read from the offline store.
    OfflineStore(TileId),
    /// Ancestor tile URL.
    Url(String),
}

impl fmt::Display for FallbackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackSource::OfflineStore(id) => write!(f, "offline:{}", id),
            FallbackSource::Url(url) => f.write_str(url),
        }
    }
}

/// "Tile substituted" notification.
///
/// Fire-and-forget: emitted on a broadcast channel whether or not anyone
/// listens. Consumers typically badge degraded imagery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSubstituted {
    /// Id of the tile that was requested.
    pub tile: TileId,
    /// URL originally requested for the tile.
    pub url: String,
    /// Source that failed, as it was just before the swap.
    pub url_missing: String,
    /// Source now being shown.
    pub url_fallback: FallbackSource,
    /// Resize/crop for ancestor imagery; `None` when the substitute has the
    /// tile's own extent.
    pub style: Option<TileStyle>,
}

/// Where an in-flight tile is in its load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilePhase {
    Requesting,
    TryingOfflineStore,
    TryingAncestorZoom,
}
