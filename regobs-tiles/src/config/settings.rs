//! Configuration settings structs.

use std::path::PathBuf;

use crate::cache::DEFAULT_RECENCY_CAPACITY;
use crate::coord::LatLngBounds;
use crate::fallback::OfflineLookupPolicy;
use crate::layer::{DEFAULT_EDGE_BUFFER_TILES, DEFAULT_TILE_SIZE};
use crate::provider::DEFAULT_TIMEOUT_SECS;
use crate::save_queue::{TileImageFormat, DEFAULT_SAVE_BATCH_SIZE, DEFAULT_SAVE_THROTTLE_MS};

use super::defaults::*;

/// Contents of `config.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub tiles: TilesSettings,
    pub cache: CacheSettings,
    pub download: DownloadSettings,
    pub logging: LoggingSettings,
    /// `[layer.<name>]` sections in file order.
    pub layers: Vec<LayerSettings>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            tiles: TilesSettings::default(),
            cache: CacheSettings::default(),
            download: DownloadSettings::default(),
            logging: LoggingSettings::default(),
            layers: vec![LayerSettings::default_layer()],
        }
    }
}

impl ConfigFile {
    /// Look up a layer by name.
    pub fn layer(&self, name: &str) -> Option<&LayerSettings> {
        self.layers.iter().find(|layer| layer.name == name)
    }
}

/// `[tiles]`
#[derive(Debug, Clone, PartialEq)]
pub struct TilesSettings {
    pub tile_size: u32,
    pub edge_buffer_tiles: u32,
    pub buffer_offline: bool,
    pub offline_lookup: OfflineLookupPolicy,
    pub persist_ancestor_tiles: bool,
    pub image_format: TileImageFormat,
}

impl Default for TilesSettings {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            edge_buffer_tiles: DEFAULT_EDGE_BUFFER_TILES,
            buffer_offline: true,
            offline_lookup: OfflineLookupPolicy::default(),
            persist_ancestor_tiles: true,
            image_format: TileImageFormat::default(),
        }
    }
}

/// Backend of the offline store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Disk,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Disk => "disk",
            StoreKind::Memory => "memory",
        }
    }
}

/// `[cache]`
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub directory: PathBuf,
    pub store: StoreKind,
    /// Bytes, for the memory store.
    pub memory_size: usize,
    pub recency_capacity: usize,
    pub save_throttle_ms: u64,
    pub save_batch_size: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            store: StoreKind::default(),
            memory_size: DEFAULT_MEMORY_STORE_SIZE,
            recency_capacity: DEFAULT_RECENCY_CAPACITY,
            save_throttle_ms: DEFAULT_SAVE_THROTTLE_MS,
            save_batch_size: DEFAULT_SAVE_BATCH_SIZE,
        }
    }
}

/// `[download]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Seconds.
    pub timeout: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// `[layer.<name>]`
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSettings {
    pub name: String,
    pub url: String,
    /// `None` keeps the template defaults.
    pub subdomains: Option<Vec<String>>,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub tms: bool,
    pub retina: bool,
    /// Tiles outside these bounds are not requested.
    pub bounds: Option<LatLngBounds>,
    /// GeoJSON file with the exclusion region.
    pub exclusion: Option<PathBuf>,
}

impl LayerSettings {
    /// A layer with default zoom range and no restrictions.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            subdomains: None,
            min_zoom: DEFAULT_LAYER_MIN_ZOOM,
            max_zoom: DEFAULT_LAYER_MAX_ZOOM,
            tms: false,
            retina: false,
            bounds: None,
            exclusion: None,
        }
    }

    /// Layer used when the file configures none.
    pub fn default_layer() -> Self {
        Self::new(DEFAULT_LAYER_NAME, DEFAULT_LAYER_URL)
    }
}
