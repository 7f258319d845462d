//! Configuration file handling.
//!
//! `config.ini` lives in the platform configuration directory
//! (`~/.config/regobs-tiles/config.ini` on Linux). A missing file means
//! defaults. Settings structs live in `settings`, parsing in `parser`,
//! serialization in `writer`.

mod defaults;
mod file;
mod parser;
mod settings;
mod size;
mod writer;

pub use defaults::{
    config_directory, config_file_path, default_cache_directory, default_log_directory,
    DEFAULT_LAYER_MAX_ZOOM, DEFAULT_LAYER_MIN_ZOOM, DEFAULT_LAYER_NAME, DEFAULT_LAYER_URL,
    DEFAULT_LOG_FILE, DEFAULT_MEMORY_STORE_SIZE,
};
pub use file::ConfigFileError;
pub use parser::LAYER_SECTION_PREFIX;
pub use settings::{
    CacheSettings, ConfigFile, DownloadSettings, LayerSettings, LoggingSettings, StoreKind,
    TilesSettings,
};
pub use crate::save_queue::TileImageFormat;
pub use size::{format_size, parse_size, SizeParseError};
