//! Geographic exclusion filter.
//!
//! A tile layer may be given a region in which it must not request tiles
//! at all, typically because another layer covers it. A tile whose
//! bounding box lies entirely inside the region is treated as invalid:
//! no fetch, no store lookup, no fallback.
//!
//! Regions are read from GeoJSON (`Polygon`, `MultiPolygon`, or a
//! `Feature`/`FeatureCollection` of those) in longitude/latitude order.

mod geojson;

use std::path::Path;

use geo::Contains;
use geo_types::{Coord, MultiPolygon, Polygon, Rect};
use thiserror::Error;

use crate::coord::LatLngBounds;

/// Errors building an exclusion region.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Input is not valid GeoJSON of a supported shape.
    #[error("invalid GeoJSON: {0}")]
    Parse(String),

    /// Geometry type that cannot enclose an area.
    #[error("{0} geometry cannot be used as an exclusion region")]
    NotPolygonal(&'static str),

    /// No polygons in the input.
    #[error("exclusion geometry contains no polygons")]
    Empty,

    /// Ring with fewer than four positions.
    #[error("polygon ring has {0} positions, at least 4 required")]
    RingTooShort(usize),

    /// First and last ring positions differ.
    #[error("polygon ring is not closed")]
    RingNotClosed,

    /// Position outside lon [-180, 180] / lat [-90, 90].
    #[error("position ({lon}, {lat}) is outside the valid coordinate range")]
    OutOfRange { lon: f64, lat: f64 },

    /// Geometry file could not be read.
    #[error("failed to read exclusion geometry {path}: {reason}")]
    Read { path: String, reason: String },
}

/// An immutable exclusion region.
#[derive(Debug, Clone, PartialEq)]
pub struct ExclusionRegion {
    geometry: MultiPolygon<f64>,
}

impl ExclusionRegion {
    /// Wrap an existing geometry.
    pub fn new(geometry: MultiPolygon<f64>) -> Result<Self, GeometryError> {
        if geometry.0.is_empty() {
            return Err(GeometryError::Empty);
        }
        Ok(Self { geometry })
    }

    /// Parse a GeoJSON document.
    pub fn from_geojson(text: &str) -> Result<Self, GeometryError> {
        Self::new(geojson::parse_multi_polygon(text)?)
    }

    /// Read a GeoJSON document from disk.
    pub fn from_file(path: &Path) -> Result<Self, GeometryError> {
        let text = std::fs::read_to_string(path).map_err(|e| GeometryError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_geojson(&text)
    }

    /// Region covering the given box.
    pub fn from_bounds(bounds: &LatLngBounds) -> Self {
        Self {
            geometry: MultiPolygon::new(vec![bounds_polygon(bounds)]),
        }
    }

    /// The underlying geometry.
    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Whether `bounds` lies entirely inside one of the region's polygons.
    ///
    /// Touching the region's boundary from the inside still counts as
    /// contained.
    pub fn contains_bounds(&self, bounds: &LatLngBounds) -> bool {
        let tile = bounds_polygon(bounds);
        self.geometry.0.iter().any(|polygon| polygon.contains(&tile))
    }
}

/// True when the tile's bounding box is fully inside the exclusion region.
pub fn is_tile_excluded(tile_bounds: &LatLngBounds, region: &ExclusionRegion) -> bool {
    region.contains_bounds(tile_bounds)
}

fn bounds_polygon(bounds: &LatLngBounds) -> Polygon<f64> {
    Rect::new(
        Coord {
            x: bounds.west(),
            y: bounds.south(),
        },
        Coord {
            x: bounds.east(),
            y: bounds.north(),
        },
    )
    .to_polygon()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{tile_bounds, TileCoord};

    // Svalbard
    fn svalbard() -> ExclusionRegion {
        ExclusionRegion::from_geojson(
            r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[
                [-0.7, 73.5],[36.2, 73.5],[36.2, 81.4],[-0.7, 81.4],[-0.7, 73.5]
            ]]}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_tile_inside_region_is_excluded() {
        // Longyearbyen at zoom 10
        let coord = TileCoord::new(10, 556, 142).unwrap();
        let bounds = tile_bounds(&coord);
        assert!(bounds.contains(78.2, 15.6));
        assert!(is_tile_excluded(&bounds, &svalbard()));
    }

    #[test]
    fn test_tile_outside_region_is_kept() {
        // Oslo
        let bounds = tile_bounds(&TileCoord::new(10, 542, 297).unwrap());
        assert!(!is_tile_excluded(&bounds, &svalbard()));
    }

    #[test]
    fn test_partially_overlapping_tile_is_kept() {
        // zoom 2 tile covering the whole north-east quadrant
        let bounds = tile_bounds(&TileCoord::new(2, 2, 0).unwrap());
        assert!(!is_tile_excluded(&bounds, &svalbard()));
    }

    #[test]
    fn test_from_bounds() {
        let region = ExclusionRegion::from_bounds(&LatLngBounds::new(0.0, 0.0, 10.0, 10.0));
        assert!(region.contains_bounds(&LatLngBounds::new(1.0, 1.0, 2.0, 2.0)));
        assert!(region.contains_bounds(&LatLngBounds::new(0.0, 0.0, 10.0, 10.0)));
        assert!(!region.contains_bounds(&LatLngBounds::new(5.0, 5.0, 11.0, 6.0)));
    }

    #[test]
    fn test_hole_is_not_excluded() {
        let region = ExclusionRegion::from_geojson(
            r#"{"type":"Polygon","coordinates":[
                [[0,0],[10,0],[10,10],[0,10],[0,0]],
                [[4,4],[6,4],[6,6],[4,6],[4,4]]
            ]}"#,
        )
        .unwrap();
        assert!(!region.contains_bounds(&LatLngBounds::new(4.5, 4.5, 5.5, 5.5)));
        assert!(region.contains_bounds(&LatLngBounds::new(1.0, 1.0, 2.0, 2.0)));
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(
            ExclusionRegion::new(MultiPolygon::new(vec![])),
            Err(GeometryError::Empty)
        );
    }

    #[test]
    fn test_from_file_missing() {
        let result = ExclusionRegion::from_file(Path::new("/nonexistent/region.geojson"));
        assert!(matches!(result, Err(GeometryError::Read { .. })));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.geojson");
        std::fs::write(
            &path,
            r#"{"type":"Polygon","coordinates":[[[0,0],[10,0],[10,10],[0,10],[0,0]]]}"#,
        )
        .unwrap();
        let region = ExclusionRegion::from_file(&path).unwrap();
        assert_eq!(region.geometry().0.len(), 1);
    }
}
