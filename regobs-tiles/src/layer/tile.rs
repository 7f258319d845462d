//! Results of loading a tile.

use std::sync::Arc;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::coord::{TileCoord, TileId};
use crate::error::TileError;
use crate::fallback::TileStyle;

/// Where displayed imagery came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileSource {
    /// Fetched from this URL.
    Network(String),
    /// Read from the offline store under this id.
    OfflineStore(TileId),
}

impl TileSource {
    /// The source as an element `src` would show it.
    pub fn as_src(&self) -> String {
        match self {
            TileSource::Network(url) => url.clone(),
            TileSource::OfflineStore(id) => format!("offline:{}", id),
        }
    }
}

/// A tile that is being displayed.
#[derive(Debug, Clone)]
pub struct LoadedTile {
    /// Id of the requested tile.
    pub tile: TileId,
    /// Requested coordinate.
    pub coord: TileCoord,
    /// Coordinate of the imagery actually shown; an ancestor after fallback.
    pub displayed: TileCoord,
    pub source: TileSource,
    /// Decoded imagery of `displayed`.
    pub image: Arc<DynamicImage>,
    /// Resize/crop to apply; `None` when `displayed == coord`.
    pub style: Option<TileStyle>,
}

impl LoadedTile {
    /// Render the tile as it appears on the map, `tile_size` pixels square.
    ///
    /// For ancestor imagery only the quadrant covering the requested tile is
    /// cut out and enlarged, which gives the same pixels as scaling the whole
    /// ancestor by the style's size and clipping.
    pub fn compose(&self, tile_size: u32) -> DynamicImage {
        let Some(style) = self.style else {
            if self.image.width() == tile_size && self.image.height() == tile_size {
                return (*self.image).clone();
            }
            return self.image.resize_exact(tile_size, tile_size, FilterType::Triangle);
        };

        let enlarged = f64::from(style.width.max(1));
        let (left, top) = style.crop_origin();
        let fx = f64::from(self.image.width()) / enlarged;
        let fy = f64::from(self.image.height()) / enlarged;

        let x = (f64::from(left) * fx).floor() as u32;
        let y = (f64::from(top) * fy).floor() as u32;
        let w = ((f64::from(tile_size) * fx).round() as u32).max(1);
        let h = ((f64::from(tile_size) * fy).round() as u32).max(1);

        self.image
            .crop_imm(x, y, w, h)
            .resize_exact(tile_size, tile_size, FilterType::Triangle)
    }
}

/// Terminal state of one tile load.
#[derive(Debug, Clone)]
pub enum TileLoadOutcome {
    /// Displayed from the network at its own coordinate.
    Loaded(LoadedTile),
    /// Displayed from the offline store.
    SubstitutedFromStore(LoadedTile),
    /// Displayed from an enlarged ancestor.
    SubstitutedFromAncestor(LoadedTile),
    /// Nothing displayable; the tile stays blank.
    Exhausted(TileError),
    /// Not served by this layer; nothing was requested.
    Invalid,
    /// Discarded before it finished.
    Cancelled,
}

impl TileLoadOutcome {
    /// The displayed tile, if any.
    pub fn tile(&self) -> Option<&LoadedTile> {
        match self {
            TileLoadOutcome::Loaded(tile)
            | TileLoadOutcome::SubstitutedFromStore(tile)
            | TileLoadOutcome::SubstitutedFromAncestor(tile) => Some(tile),
            _ => None,
        }
    }

    pub fn is_displayed(&self) -> bool {
        self.tile().is_some()
    }

    /// Short label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            TileLoadOutcome::Loaded(_) => "loaded",
            TileLoadOutcome::SubstitutedFromStore(_) => "offline",
            TileLoadOutcome::SubstitutedFromAncestor(_) => "ancestor",
            TileLoadOutcome::Exhausted(_) => "exhausted",
            TileLoadOutcome::Invalid => "invalid",
            TileLoadOutcome::Cancelled => "cancelled",
        }
    }
}
