//! Configuration CLI commands.

use std::path::Path;

use clap::Subcommand;
use regobs_tiles::config::{config_file_path, ConfigFile};

use super::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print the effective configuration
    Show,

    /// Write a default configuration file if none exists
    Init,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => {
            let path = config_path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            print!("{}", config.to_ini_string());
            Ok(())
        }
        ConfigCommands::Init => run_init(config_path),
    }
}

fn run_init(config_path: Option<&Path>) -> Result<(), CliError> {
    let path = match config_path {
        Some(path) => {
            if !path.exists() {
                ConfigFile::default().save_to(path)?;
            }
            path.to_path_buf()
        }
        None => ConfigFile::ensure_exists()?,
    };
    println!("Configuration: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");

        run_init(Some(&path)).unwrap();

        assert!(path.exists());
        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[download]\ntimeout = 7\n").unwrap();

        run_init(Some(&path)).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap().download.timeout, 7);
    }
}
