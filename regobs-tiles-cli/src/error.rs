//! CLI error type.

use std::fmt;
use std::process;

use regobs_tiles::app::AppError;
use regobs_tiles::config::ConfigFileError;
use regobs_tiles::coord::CoordError;

/// Errors reported by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or is inconsistent.
    Config(String),
    /// Configuration file could not be read or written.
    ConfigFile(ConfigFileError),
    /// Application failed to start.
    App(AppError),
    /// Tokio runtime could not be created.
    Runtime(String),
    /// Tile coordinate out of range.
    Coordinate(CoordError),
    /// No layer with this name is configured.
    UnknownLayer(String),
    /// Tile could not be displayed.
    TileUnavailable(String),
    /// Composed tile could not be written.
    Output(String),
    CacheStats(String),
    CacheClear(String),
}

impl CliError {
    /// Print the error and exit with a failure status.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        process::exit(1);
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::App(e) => write!(f, "Failed to start: {}", e),
            CliError::Runtime(msg) => write!(f, "Failed to create runtime: {}", msg),
            CliError::Coordinate(e) => write!(f, "Invalid tile: {}", e),
            CliError::UnknownLayer(name) => write!(
                f,
                "No layer named '{}'. Use 'regobs-tiles config show' to list layers.",
                name
            ),
            CliError::TileUnavailable(msg) => write!(f, "Tile unavailable: {}", msg),
            CliError::Output(msg) => write!(f, "Failed to write tile image: {}", msg),
            CliError::CacheStats(msg) => write!(f, "Failed to read offline store: {}", msg),
            CliError::CacheClear(msg) => write!(f, "Failed to clear offline store: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coordinate(e)
    }
}
