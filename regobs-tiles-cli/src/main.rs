//! RegObs tiles CLI - Command-line interface
//!
//! Fetch single tiles through the offline layer, inspect tile ids and
//! viewport ranges, and manage the offline store and configuration.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{cache, config, fetch, tiles};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "regobs-tiles")]
#[command(version, about = "Offline map tiles with ancestor-zoom fallback")]
struct Cli {
    /// Configuration file (default: ~/.config/regobs-tiles/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load one tile through the offline layer
    Fetch(fetch::FetchArgs),

    /// Print the offline store id of a tile
    Id(tiles::IdArgs),

    /// List the tiles a viewport requests
    Range(tiles::RangeArgs),

    /// Manage the offline tile store
    Cache {
        #[command(subcommand)]
        action: cache::CacheAction,
    },

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Fetch(args) => fetch::run(args, config_path, cli.verbose),
        Commands::Id(args) => tiles::run_id(args, config_path),
        Commands::Range(args) => tiles::run_range(args, config_path),
        Commands::Cache { action } => cache::run(action, config_path),
        Commands::Config { command } => config::run(command, config_path),
    }
}
