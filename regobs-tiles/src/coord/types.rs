//! Tile coordinate type.

use std::fmt;

use thiserror::Error;

/// Maximum supported zoom level.
pub const MAX_ZOOM: u8 = 24;

/// Northern edge of the Web Mercator world, in degrees.
pub const MAX_LAT: f64 = 85.05112878;

/// Southern edge of the Web Mercator world, in degrees.
pub const MIN_LAT: f64 = -85.05112878;

/// Errors for invalid tile coordinates.
///
/// These are programmer/configuration errors: callers are expected to fail
/// fast rather than recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    /// Zoom level above [`MAX_ZOOM`].
    #[error("invalid zoom level {0} (max {MAX_ZOOM})")]
    InvalidZoom(u8),

    /// x or y outside the `2^z` grid.
    #[error("tile ({z}, {x}, {y}) is outside the grid at zoom {z}")]
    OutOfRange { z: u8, x: u32, y: u32 },
}

/// A tile in the slippy-map quad-tree.
///
/// Tile `(x, y)` at zoom `z` covers one quarter of its parent
/// `(x / 2, y / 2)` at zoom `z - 1`. Values are validated at construction
/// and never change afterwards.
///
/// # Example
///
/// ```
/// use regobs_tiles::coord::TileCoord;
///
/// let tile = TileCoord::new(10, 513, 341).unwrap();
/// let parent = tile.parent().unwrap();
/// assert_eq!((parent.z(), parent.x(), parent.y()), (9, 256, 170));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    z: u8,
    x: u32,
    y: u32,
}

impl TileCoord {
    /// Create a validated tile coordinate.
    pub fn new(z: u8, x: u32, y: u32) -> Result<Self, CoordError> {
        if z > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(z));
        }
        let n = Self::tiles_per_axis(z);
        if x as u64 >= n || y as u64 >= n {
            return Err(CoordError::OutOfRange { z, x, y });
        }
        Ok(Self { z, x, y })
    }

    /// Create a coordinate with `x` wrapped around the antimeridian.
    ///
    /// `y` is not wrapped; it must already lie inside the world.
    pub fn wrapping(z: u8, x: i64, y: u32) -> Result<Self, CoordError> {
        if z > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(z));
        }
        let n = Self::tiles_per_axis(z) as i64;
        let wrapped = x.rem_euclid(n) as u32;
        Self::new(z, wrapped, y)
    }

    /// Number of tiles along one axis at the given zoom.
    #[inline]
    pub fn tiles_per_axis(z: u8) -> u64 {
        1u64 << z
    }

    /// Zoom level.
    #[inline]
    pub fn z(&self) -> u8 {
        self.z
    }

    /// Column (west to east).
    #[inline]
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Row (north to south).
    #[inline]
    pub fn y(&self) -> u32 {
        self.y
    }

    /// The tile one zoom level up that contains this tile.
    ///
    /// Returns `None` at zoom 0.
    pub fn parent(&self) -> Option<TileCoord> {
        if self.z == 0 {
            return None;
        }
        Some(Self {
            z: self.z - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }

    /// Row counted from the south edge (TMS convention).
    pub fn inverted_y(&self) -> u32 {
        (Self::tiles_per_axis(self.z) - 1 - self.y as u64) as u32
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let tile = TileCoord::new(5, 10, 12).unwrap();
        assert_eq!(tile.z(), 5);
        assert_eq!(tile.x(), 10);
        assert_eq!(tile.y(), 12);
    }

    #[test]
    fn test_display_is_slash_separated() {
        assert_eq!(TileCoord::new(5, 10, 12).unwrap().to_string(), "5/10/12");
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(
            TileCoord::new(2, 4, 0),
            Err(CoordError::OutOfRange { z: 2, x: 4, y: 0 })
        );
        assert!(TileCoord::new(2, 0, 4).is_err());
        assert!(TileCoord::new(0, 0, 0).is_ok());
    }

    #[test]
    fn test_new_rejects_zoom() {
        assert_eq!(
            TileCoord::new(MAX_ZOOM + 1, 0, 0),
            Err(CoordError::InvalidZoom(MAX_ZOOM + 1))
        );
    }

    #[test]
    fn test_max_coords_at_max_zoom() {
        let max = (TileCoord::tiles_per_axis(MAX_ZOOM) - 1) as u32;
        assert!(TileCoord::new(MAX_ZOOM, max, max).is_ok());
    }

    #[test]
    fn test_wrapping() {
        let tile = TileCoord::wrapping(3, -1, 2).unwrap();
        assert_eq!(tile.x(), 7);
        let tile = TileCoord::wrapping(3, 9, 2).unwrap();
        assert_eq!(tile.x(), 1);
        assert!(TileCoord::wrapping(3, 0, 8).is_err());
    }

    #[test]
    fn test_parent_successive_halving() {
        let tile = TileCoord::new(10, 513, 341).unwrap();
        let p1 = tile.parent().unwrap();
        assert_eq!((p1.z(), p1.x(), p1.y()), (9, 256, 170));
        let p2 = p1.parent().unwrap();
        assert_eq!((p2.z(), p2.x(), p2.y()), (8, 128, 85));
    }

    #[test]
    fn test_parent_of_root() {
        assert!(TileCoord::new(0, 0, 0).unwrap().parent().is_none());
    }

    #[test]
    fn test_inverted_y() {
        let tile = TileCoord::new(3, 0, 0).unwrap();
        assert_eq!(tile.inverted_y(), 7);
        let tile = TileCoord::new(3, 0, 7).unwrap();
        assert_eq!(tile.inverted_y(), 0);
    }
}
