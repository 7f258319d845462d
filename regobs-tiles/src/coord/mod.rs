//! Tile addressing.
//!
//! Provides the quad-tree tile coordinate type used by every tile layer, the
//! durable tile identifier derived from it, and conversions from tile
//! coordinates to geographic bounds (Web Mercator, slippy-map convention).

mod bounds;
mod id;
mod types;

pub use bounds::LatLngBounds;
pub use id::{compute_tile_id, TileId};
pub use types::{CoordError, TileCoord, MAX_LAT, MAX_ZOOM, MIN_LAT};

use std::f64::consts::PI;

/// Converts a tile corner to geographic coordinates.
///
/// `col`/`row` may equal `2^zoom`, which addresses the far (east/south) edge
/// of the last tile on that axis.
///
/// Returns `(lat, lon)` in degrees.
#[inline]
pub fn tile_corner_to_lat_lon(col: u64, row: u64, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);

    let lon = col as f64 / n * 360.0 - 180.0;

    // Inverse Web Mercator
    let y = row as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

/// Converts tile coordinates to the latitude/longitude of the tile's
/// northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    tile_corner_to_lat_lon(tile.x() as u64, tile.y() as u64, tile.z())
}

/// Projects a geographic position to global pixel coordinates at `zoom`.
///
/// Latitude is clamped to the Web Mercator range. Returns `(x, y)` with the
/// origin at the north-west corner of the world.
pub fn lat_lon_to_pixel(lat: f64, lon: f64, zoom: u8, tile_size: u32) -> (f64, f64) {
    let world = f64::from(tile_size) * 2.0_f64.powi(zoom as i32);
    let lat_rad = lat.clamp(MIN_LAT, MAX_LAT).to_radians();

    let x = (lon + 180.0) / 360.0 * world;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * world;

    (x, y)
}

/// Geographic bounds covered by a tile.
pub fn tile_bounds(tile: &TileCoord) -> LatLngBounds {
    let (north, west) = tile_to_lat_lon(tile);
    let (south, east) =
        tile_corner_to_lat_lon(tile.x() as u64 + 1, tile.y() as u64 + 1, tile.z());
    LatLngBounds::new(south, west, north, east)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lon_to_pixel_inverts_tile_corner() {
        let (lat, lon) = tile_corner_to_lat_lon(542, 297, 10);
        let (x, y) = lat_lon_to_pixel(lat, lon, 10, 256);
        assert!((x - 542.0 * 256.0).abs() < 1e-6);
        assert!((y - 297.0 * 256.0).abs() < 1e-6);
    }

    #[test]
    fn test_lat_lon_to_pixel_clamps_poles() {
        let (_, y) = lat_lon_to_pixel(90.0, 0.0, 0, 256);
        assert!(y.abs() < 1e-6);
        let (_, y) = lat_lon_to_pixel(-90.0, 0.0, 0, 256);
        assert!((y - 256.0).abs() < 1e-6);
    }

    #[test]
    fn test_tile_to_lat_lon_origin() {
        let tile = TileCoord::new(0, 0, 0).unwrap();
        let (lat, lon) = tile_to_lat_lon(&tile);
        assert!((lat - MAX_LAT).abs() < 1e-6);
        assert!((lon + 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_tile_to_lat_lon_at_equator() {
        // At zoom 10, tile 512,512 has its northwest corner at 0,0
        let tile = TileCoord::new(10, 512, 512).unwrap();
        let (lat, lon) = tile_to_lat_lon(&tile);
        assert!(lat.abs() < 1e-9, "Should be on the equator");
        assert!(lon.abs() < 1e-9, "Should be on the prime meridian");
    }

    #[test]
    fn test_tile_bounds_world() {
        let bounds = tile_bounds(&TileCoord::new(0, 0, 0).unwrap());
        assert!((bounds.west() + 180.0).abs() < 1e-9);
        assert!((bounds.east() - 180.0).abs() < 1e-9);
        assert!((bounds.north() - MAX_LAT).abs() < 1e-6);
        assert!((bounds.south() - MIN_LAT).abs() < 1e-6);
    }

    #[test]
    fn test_tile_bounds_oslo() {
        // Zoom 10 tile covering central Oslo (59.91N, 10.74E)
        let bounds = tile_bounds(&TileCoord::new(10, 542, 297).unwrap());
        assert!(bounds.contains(59.911197, 10.741059));
        assert!(bounds.north() > bounds.south());
        assert!(bounds.east() > bounds.west());
    }

    #[test]
    fn test_child_bounds_inside_parent() {
        let child = TileCoord::new(10, 513, 341).unwrap();
        let parent = child.parent().unwrap();
        let cb = tile_bounds(&child);
        let pb = tile_bounds(&parent);
        assert!(cb.north() <= pb.north() + 1e-9);
        assert!(cb.south() >= pb.south() - 1e-9);
        assert!(cb.west() >= pb.west() - 1e-9);
        assert!(cb.east() <= pb.east() + 1e-9);
    }
}
