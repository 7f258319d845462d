//! CLI command implementations.

pub mod cache;
pub mod config;
pub mod fetch;
pub mod tiles;

use std::path::Path;

use regobs_tiles::config::ConfigFile;
use tokio::runtime::Runtime;

use crate::error::CliError;

/// Load the configuration from `path`, or the default location.
///
/// A missing file gives the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// Multi-threaded runtime for commands that start the layer.
pub fn build_runtime() -> Result<Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_config_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("none.ini"))).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[tiles]\ntile_size = huge\n").unwrap();

        assert!(matches!(
            load_config(Some(&path)),
            Err(CliError::ConfigFile(_))
        ));
    }
}
