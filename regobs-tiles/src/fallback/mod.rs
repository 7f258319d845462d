//! Fallback and scale synthesis.
//!
//! When a tile cannot be displayed, its chain first consults the offline
//! store and then walks up the zoom levels, each time substituting the
//! ancestor tile enlarged and cropped to the original tile's footprint.
//! This module holds the pure state machine and geometry; the layer
//! drives it.

mod state;
mod style;

pub use state::{FallbackState, FallbackStep, OfflineLookupPolicy};
pub use style::{ClipRect, TileStyle};
