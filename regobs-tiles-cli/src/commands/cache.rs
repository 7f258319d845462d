//! Offline store management CLI commands.

use std::path::Path;

use clap::Subcommand;
use regobs_tiles::cache::{clear_disk_store, disk_store_stats};
use regobs_tiles::config::{format_size, StoreKind};

use super::load_config;
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Remove every tile from the offline store
    Clear,
    /// Show offline store statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    if config.cache.store == StoreKind::Memory {
        println!("Offline store is in memory; nothing is kept between runs.");
        return Ok(());
    }
    let store_dir = &config.cache.directory;

    match action {
        CacheAction::Clear => {
            println!("Clearing offline store at: {}", store_dir.display());
            let removed = clear_disk_store(store_dir).map_err(|e| CliError::CacheClear(e.to_string()))?;
            println!(
                "Deleted {} tiles, freed {}",
                removed.files,
                format_size(removed.bytes as usize)
            );
            Ok(())
        }
        CacheAction::Stats => {
            println!("Offline store: {}", store_dir.display());
            let stats = disk_store_stats(store_dir).map_err(|e| CliError::CacheStats(e.to_string()))?;
            println!("  Tiles: {}", stats.files);
            println!("  Size:  {}", format_size(stats.bytes as usize));
            Ok(())
        }
    }
}
