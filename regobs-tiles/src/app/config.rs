//! Application configuration.
//!
//! [`AppConfig`] is the runtime view of a [`ConfigFile`]: settings are
//! grouped by the service that consumes them rather than by INI section.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    ConfigFile, LayerSettings, StoreKind, TilesSettings, DEFAULT_MEMORY_STORE_SIZE,
};
use crate::cache::DEFAULT_RECENCY_CAPACITY;
use crate::layer::LayerOptions;
use crate::provider::DEFAULT_TIMEOUT_SECS;
use crate::save_queue::SaveQueueConfig;

/// Offline store configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreAppConfig {
    pub kind: StoreKind,
    /// Directory of the disk store.
    pub directory: PathBuf,
    /// Capacity of the memory store in bytes.
    pub memory_size_bytes: u64,
}

impl StoreAppConfig {
    /// Disk store rooted at `directory`.
    pub fn disk(directory: impl Into<PathBuf>) -> Self {
        Self {
            kind: StoreKind::Disk,
            directory: directory.into(),
            memory_size_bytes: DEFAULT_MEMORY_STORE_SIZE as u64,
        }
    }

    /// In-memory store of the given capacity.
    pub fn memory(memory_size_bytes: u64) -> Self {
        Self {
            kind: StoreKind::Memory,
            directory: PathBuf::new(),
            memory_size_bytes,
        }
    }
}

/// Everything [`RegObsTilesApp`](super::RegObsTilesApp) needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreAppConfig,
    pub tiles: TilesSettings,
    pub save_queue: SaveQueueConfig,
    pub recency_capacity: usize,
    pub download_timeout_secs: u64,
    pub layers: Vec<LayerSettings>,
}

impl AppConfig {
    /// Configuration with defaults and the given store.
    pub fn new(store: StoreAppConfig) -> Self {
        Self {
            store,
            tiles: TilesSettings::default(),
            save_queue: SaveQueueConfig::default(),
            recency_capacity: DEFAULT_RECENCY_CAPACITY,
            download_timeout_secs: DEFAULT_TIMEOUT_SECS,
            layers: vec![LayerSettings::default_layer()],
        }
    }

    /// Build from a loaded configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            store: StoreAppConfig {
                kind: config.cache.store,
                directory: config.cache.directory.clone(),
                memory_size_bytes: config.cache.memory_size as u64,
            },
            tiles: config.tiles.clone(),
            save_queue: SaveQueueConfig {
                throttle: Duration::from_millis(config.cache.save_throttle_ms),
                batch_size: config.cache.save_batch_size,
                image_format: config.tiles.image_format,
                ..SaveQueueConfig::default()
            },
            recency_capacity: config.cache.recency_capacity,
            download_timeout_secs: config.download.timeout,
            layers: config.layers.clone(),
        }
    }

    /// Replace the configured layers.
    pub fn with_layers(mut self, layers: Vec<LayerSettings>) -> Self {
        self.layers = layers;
        self
    }

    /// Layer options for one configured layer.
    pub fn layer_options(&self, layer: &LayerSettings) -> LayerOptions {
        LayerOptions {
            name: layer.name.clone(),
            tile_size: self.tiles.tile_size,
            edge_buffer_tiles: self.tiles.edge_buffer_tiles,
            buffer_offline: self.tiles.buffer_offline,
            offline_lookup: self.tiles.offline_lookup,
            persist_ancestor_tiles: self.tiles.persist_ancestor_tiles,
        }
    }
}
