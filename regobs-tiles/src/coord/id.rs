//! Durable tile identifiers.
//!
//! A [`TileId`] is the cache key for a tile everywhere: in the recency cache,
//! the per-tile fallback map and the offline store. It is persisted, so the
//! format must never change between releases.
//!
//! # Format
//!
//! `{layer}_{z}_{x}_{y}`, e.g. `base_5_10_12`. The last three segments are
//! always decimal numbers, so splitting from the right recovers the layer
//! name even when it contains underscores; two distinct
//! `(layer, z, x, y)` tuples can never share an id.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TileCoord;

/// Stable identifier of a tile within a named layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(String);

impl TileId {
    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the identifier back into its layer name and coordinate.
    ///
    /// Returns `None` when the string was not produced by
    /// [`compute_tile_id`].
    pub fn parse(id: &str) -> Option<(String, TileCoord)> {
        let mut parts = id.rsplitn(4, '_');
        let y = parts.next()?.parse().ok()?;
        let x = parts.next()?.parse().ok()?;
        let z = parts.next()?.parse().ok()?;
        let layer = parts.next()?;
        if layer.is_empty() {
            return None;
        }
        let coord = TileCoord::new(z, x, y).ok()?;
        Some((layer.to_string(), coord))
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the identifier for a tile of the given layer.
///
/// Pure and deterministic: the same inputs give the same id in every
/// process.
///
/// # Example
///
/// ```
/// use regobs_tiles::coord::{compute_tile_id, TileCoord};
///
/// let id = compute_tile_id("base", &TileCoord::new(5, 10, 12).unwrap());
/// assert_eq!(id.as_str(), "base_5_10_12");
/// ```
pub fn compute_tile_id(layer_name: &str, coord: &TileCoord) -> TileId {
    TileId(format!(
        "{}_{}_{}_{}",
        layer_name,
        coord.z(),
        coord.x(),
        coord.y()
    ))
}
