//! Tile ranges for a viewport.
//!
//! A viewport is a rectangle in global pixel space at some zoom. The tiles
//! needed to cover it are those overlapping the rectangle, widened by an
//! edge buffer of whole tiles on every side so panning reveals tiles that
//! are already loaded. Columns wrap around the antimeridian; rows are
//! clamped to the world.

use crate::coord::{lat_lon_to_pixel, TileCoord};

/// Inclusive range of tiles at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    zoom: u8,
    min_x: i64,
    max_x: i64,
    min_y: i64,
    max_y: i64,
}

impl TileRange {
    /// Tiles covering the pixel rectangle `[min, max]` at `zoom`.
    pub fn from_pixel_bounds(
        zoom: u8,
        min: (f64, f64),
        max: (f64, f64),
        tile_size: u32,
        edge_buffer_tiles: u32,
    ) -> Self {
        let size = f64::from(tile_size.max(1));
        let buffer = size * f64::from(edge_buffer_tiles);
        let n = TileCoord::tiles_per_axis(zoom) as i64;

        let min_x = ((min.0 - buffer) / size).floor() as i64;
        let max_x = ((max.0 + buffer) / size).ceil() as i64 - 1;
        let min_y = (((min.1 - buffer) / size).floor() as i64).max(0);
        let max_y = (((max.1 + buffer) / size).ceil() as i64 - 1).min(n - 1);

        // Never list a column twice
        let max_x = max_x.min(min_x + n - 1);

        Self {
            zoom,
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Tiles for a viewport of `width` x `height` pixels centred on a position.
    pub fn for_viewport(
        center_lat: f64,
        center_lon: f64,
        zoom: u8,
        width: u32,
        height: u32,
        tile_size: u32,
        edge_buffer_tiles: u32,
    ) -> Self {
        let (cx, cy) = lat_lon_to_pixel(center_lat, center_lon, zoom, tile_size);
        let half_w = f64::from(width) / 2.0;
        let half_h = f64::from(height) / 2.0;
        Self::from_pixel_bounds(
            zoom,
            (cx - half_w, cy - half_h),
            (cx + half_w, cy + half_h),
            tile_size,
            edge_buffer_tiles,
        )
    }

    /// Number of tiles in the range.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        ((self.max_x - self.min_x + 1) * (self.max_y - self.min_y + 1)) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Tiles in the range, nearest to the centre first.
    pub fn tiles(&self) -> Vec<TileCoord> {
        if self.is_empty() {
            return Vec::new();
        }

        let center_x = (self.min_x + self.max_x) as f64 / 2.0;
        let center_y = (self.min_y + self.max_y) as f64 / 2.0;

        let mut tiles: Vec<(f64, TileCoord)> = Vec::with_capacity(self.len());
        for y in self.min_y..=self.max_y {
            for x in self.min_x..=self.max_x {
                let Ok(coord) = TileCoord::wrapping(self.zoom, x, y as u32) else {
                    continue;
                };
                let dx = x as f64 - center_x;
                let dy = y as f64 - center_y;
                tiles.push((dx * dx + dy * dy, coord));
            }
        }

        tiles.sort_by(|a, b| a.0.total_cmp(&b.0));
        tiles.into_iter().map(|(_, coord)| coord).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tile_alignment() {
        let range = TileRange::from_pixel_bounds(4, (256.0, 512.0), (768.0, 1024.0), 256, 0);
        assert_eq!(range.len(), 4);
        let tiles = range.tiles();
        assert!(tiles.contains(&TileCoord::new(4, 1, 2).unwrap()));
        assert!(tiles.contains(&TileCoord::new(4, 2, 3).unwrap()));
    }

    #[test]
    fn test_edge_buffer_adds_ring() {
        let plain = TileRange::from_pixel_bounds(6, (1024.0, 1024.0), (1280.0, 1280.0), 256, 0);
        let buffered = TileRange::from_pixel_bounds(6, (1024.0, 1024.0), (1280.0, 1280.0), 256, 1);
        assert_eq!(plain.len(), 1);
        assert_eq!(buffered.len(), 9);
        assert!(buffered.tiles().contains(&TileCoord::new(6, 3, 3).unwrap()));
        assert!(buffered.tiles().contains(&TileCoord::new(6, 5, 5).unwrap()));
    }

    #[test]
    fn test_rows_clamped_to_world() {
        let range = TileRange::from_pixel_bounds(2, (0.0, 0.0), (256.0, 256.0), 256, 2);
        for tile in range.tiles() {
            assert!(tile.y() < 4);
        }
        // y 0..=2, x -2..=1 (one world width)
        assert_eq!(range.len(), 12);
    }

    #[test]
    fn test_columns_wrap() {
        let range = TileRange::from_pixel_bounds(3, (-256.0, 0.0), (256.0, 256.0), 256, 0);
        let tiles = range.tiles();
        assert!(tiles.contains(&TileCoord::new(3, 7, 0).unwrap()));
        assert!(tiles.contains(&TileCoord::new(3, 0, 0).unwrap()));
    }

    #[test]
    fn test_no_duplicate_columns_at_low_zoom() {
        let range = TileRange::from_pixel_bounds(1, (-2000.0, 0.0), (2000.0, 512.0), 256, 1);
        let tiles = range.tiles();
        assert_eq!(tiles.len(), 4);
    }

    #[test]
    fn test_center_first() {
        let range = TileRange::from_pixel_bounds(6, (1024.0, 1024.0), (1280.0, 1280.0), 256, 1);
        assert_eq!(range.tiles()[0], TileCoord::new(6, 4, 4).unwrap());
    }

    #[test]
    fn test_for_viewport_oslo() {
        let range = TileRange::for_viewport(59.911197, 10.741059, 10, 256, 256, 256, 0);
        assert!(range.len() <= 4 && !range.is_empty());
        assert!(range.tiles().contains(&TileCoord::new(10, 542, 297).unwrap()));
    }
}
