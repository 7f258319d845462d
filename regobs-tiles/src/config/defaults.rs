//! Default configuration values.

use std::path::PathBuf;

/// Memory store size (256 MB).
pub const DEFAULT_MEMORY_STORE_SIZE: usize = 256 * 1024 * 1024;

/// Name of the layer used when none is configured.
pub const DEFAULT_LAYER_NAME: &str = "topo";

/// Norwegian topographic base map.
pub const DEFAULT_LAYER_URL: &str =
    "https://opencache.statkart.no/gatekeeper/gk/gk.open_gmaps?layers=norgeskart_bakgrunn&zoom={z}&x={x}&y={y}";

pub const DEFAULT_LAYER_MIN_ZOOM: u8 = 2;

pub const DEFAULT_LAYER_MAX_ZOOM: u8 = 18;

/// Log file name.
pub const DEFAULT_LOG_FILE: &str = "regobs-tiles.log";

const APP_DIR: &str = "regobs-tiles";

/// Offline store directory, `<cache dir>/regobs-tiles/tilescache`.
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("tilescache")
}

/// Log directory, `<data dir>/regobs-tiles/logs`.
pub fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs")
}

/// Configuration directory, `<config dir>/regobs-tiles`.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Default configuration file path.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
