//! Minimal GeoJSON reading for exclusion geometries.
//!
//! Accepts a bare geometry, a `Feature` or a `FeatureCollection`. Only
//! `Polygon` and `MultiPolygon` (and collections of them) are usable as
//! exclusion regions.

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;

use super::GeometryError;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonObject {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonObject>,
    },
    Feature {
        geometry: Option<Box<GeoJsonObject>>,
    },
    FeatureCollection {
        features: Vec<GeoJsonObject>,
    },
    Point {},
    MultiPoint {},
    LineString {},
    MultiLineString {},
}

/// Parse GeoJSON text into a multi polygon in (lon, lat) coordinates.
pub(super) fn parse_multi_polygon(text: &str) -> Result<MultiPolygon<f64>, GeometryError> {
    let object: GeoJsonObject =
        serde_json::from_str(text).map_err(|e| GeometryError::Parse(e.to_string()))?;

    let mut polygons = Vec::new();
    collect_polygons(&object, &mut polygons)?;

    if polygons.is_empty() {
        return Err(GeometryError::Empty);
    }
    Ok(MultiPolygon::new(polygons))
}

fn collect_polygons(
    object: &GeoJsonObject,
    polygons: &mut Vec<Polygon<f64>>,
) -> Result<(), GeometryError> {
    match object {
        GeoJsonObject::Polygon { coordinates } => {
            polygons.push(to_polygon(coordinates)?);
        }
        GeoJsonObject::MultiPolygon { coordinates } => {
            for rings in coordinates {
                polygons.push(to_polygon(rings)?);
            }
        }
        GeoJsonObject::GeometryCollection { geometries } => {
            for geometry in geometries {
                collect_polygons(geometry, polygons)?;
            }
        }
        GeoJsonObject::Feature { geometry } => match geometry {
            Some(geometry) => collect_polygons(geometry, polygons)?,
            None => return Err(GeometryError::Empty),
        },
        GeoJsonObject::FeatureCollection { features } => {
            for feature in features {
                collect_polygons(feature, polygons)?;
            }
        }
        GeoJsonObject::Point {} => return Err(GeometryError::NotPolygonal("Point")),
        GeoJsonObject::MultiPoint {} => return Err(GeometryError::NotPolygonal("MultiPoint")),
        GeoJsonObject::LineString {} => return Err(GeometryError::NotPolygonal("LineString")),
        GeoJsonObject::MultiLineString {} => {
            return Err(GeometryError::NotPolygonal("MultiLineString"))
        }
    }
    Ok(())
}

fn to_polygon(rings: &[Vec<[f64; 2]>]) -> Result<Polygon<f64>, GeometryError> {
    let (exterior, interiors) = rings.split_first().ok_or(GeometryError::Empty)?;
    let exterior = to_ring(exterior)?;
    let interiors = interiors
        .iter()
        .map(|ring| to_ring(ring))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn to_ring(positions: &[[f64; 2]]) -> Result<LineString<f64>, GeometryError> {
    if positions.len() < 4 {
        return Err(GeometryError::RingTooShort(positions.len()));
    }
    if positions.first() != positions.last() {
        return Err(GeometryError::RingNotClosed);
    }
    for &[lon, lat] in positions {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(GeometryError::OutOfRange { lon, lat });
        }
    }
    Ok(LineString::new(
        positions.iter().map(|&[x, y]| Coord { x, y }).collect(),
    ))
}
