//! Layer options.

use crate::fallback::OfflineLookupPolicy;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default number of extra tiles requested beyond each viewport edge.
pub const DEFAULT_EDGE_BUFFER_TILES: u32 = 0;

/// Behaviour of one offline tile layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerOptions {
    /// Layer name; prefix of every tile id.
    pub name: String,
    pub tile_size: u32,
    pub edge_buffer_tiles: u32,
    /// Persist tiles displayed from the network.
    pub buffer_offline: bool,
    pub offline_lookup: OfflineLookupPolicy,
    /// Persist ancestors displayed during fallback under their own ids.
    pub persist_ancestor_tiles: bool,
}

impl LayerOptions {
    /// Options with defaults for the named layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tile_size: DEFAULT_TILE_SIZE,
            edge_buffer_tiles: DEFAULT_EDGE_BUFFER_TILES,
            buffer_offline: true,
            offline_lookup: OfflineLookupPolicy::default(),
            persist_ancestor_tiles: true,
        }
    }
}
