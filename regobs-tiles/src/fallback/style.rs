//! Resize and crop of an ancestor tile standing in for a missing one.
//!
//! The ancestor image is enlarged to `tile_size * scale` and shifted so the
//! quadrant covering the original tile sits at the tile's origin; a clip
//! rectangle of one tile's footprint hides the rest.

use std::fmt;

use crate::coord::TileCoord;

/// Clip rectangle in pixels, in CSS `rect(top right bottom left)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
    pub left: i64,
}

impl fmt::Display for ClipRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rect({}px {}px {}px {}px)",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// Presentation of a substituted tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileStyle {
    /// Displayed width of the enlarged ancestor, in pixels.
    pub width: u32,
    /// Displayed height of the enlarged ancestor, in pixels.
    pub height: u32,
    /// Vertical shift; zero or negative.
    pub margin_top: i64,
    /// Horizontal shift; zero or negative.
    pub margin_left: i64,
    /// Visible window inside the enlarged image.
    pub clip: ClipRect,
}

impl TileStyle {
    /// Style for showing `ancestor`, enlarged by `scale`, in place of `original`.
    ///
    /// `ancestor` must be the ancestor of `original` at `original.z - log2(scale)`.
    pub fn for_ancestor(original: &TileCoord, ancestor: &TileCoord, scale: u32, tile_size: u32) -> Self {
        let scale = i64::from(scale);
        let size = i64::from(tile_size);

        let top = (i64::from(original.y()) - i64::from(ancestor.y()) * scale) * size;
        let left = (i64::from(original.x()) - i64::from(ancestor.x()) * scale) * size;

        let enlarged = u32::try_from(size * scale).unwrap_or(u32::MAX);

        Self {
            width: enlarged,
            height: enlarged,
            margin_top: -top,
            margin_left: -left,
            clip: ClipRect {
                top,
                right: left + size,
                bottom: top + size,
                left,
            },
        }
    }

    /// Offset of the original tile inside the enlarged image, `(left, top)`.
    pub fn crop_origin(&self) -> (u32, u32) {
        (
            u32::try_from(self.clip.left).unwrap_or(0),
            u32::try_from(self.clip.top).unwrap_or(0),
        )
    }
}
