//! `fetch`: load one tile through the offline layer.

use std::path::{Path, PathBuf};

use clap::Args;
use image::ImageFormat;
use regobs_tiles::app::{AppConfig, RegObsTilesApp};
use regobs_tiles::config::DEFAULT_LAYER_NAME;
use regobs_tiles::coord::TileCoord;
use regobs_tiles::layer::{TileLoadOutcome, TileSource};
use regobs_tiles::logging::init_logging_with_level;
use tracing::info;

use super::{build_runtime, load_config};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Zoom level
    pub z: u8,
    /// Tile column
    pub x: u32,
    /// Tile row
    pub y: u32,

    /// Layer to load from
    #[arg(short, long, default_value = DEFAULT_LAYER_NAME)]
    pub layer: String,

    /// Write the tile as displayed to a PNG file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the fetch command.
pub fn run(args: FetchArgs, config_path: Option<&Path>, verbose: bool) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let coord = TileCoord::new(args.z, args.x, args.y)?;

    let level = if verbose { "regobs_tiles=debug" } else { "warn" };
    let _logging = init_logging_with_level(&config.logging.directory, &config.logging.file, level)
        .map_err(|e| CliError::Config(format!("cannot initialise logging: {}", e)))?;

    let app_config = AppConfig::from_config_file(&config);
    let tile_size = app_config.tiles.tile_size;

    let runtime = build_runtime()?;
    runtime.block_on(async move {
        let app = RegObsTilesApp::start(app_config).await?;
        let result = fetch_tile(&app, &args.layer, coord, tile_size, args.output.as_deref()).await;
        app.shutdown().await;
        result
    })
}

async fn fetch_tile(
    app: &RegObsTilesApp,
    layer_name: &str,
    coord: TileCoord,
    tile_size: u32,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let layer = app
        .layer(layer_name)
        .ok_or_else(|| CliError::UnknownLayer(layer_name.to_string()))?;
    let mut events = layer.subscribe();

    info!(layer = layer_name, tile = %layer.tile_id(&coord), "Fetching tile");
    let outcome = layer.load_tile(coord).await;

    while let Ok(event) = events.try_recv() {
        println!("  {} missing, using {}", event.url_missing, event.url_fallback);
    }

    let tile = match &outcome {
        TileLoadOutcome::Exhausted(e) => return Err(CliError::TileUnavailable(e.to_string())),
        TileLoadOutcome::Invalid => {
            return Err(CliError::TileUnavailable(format!(
                "{} is not served by layer '{}'",
                coord, layer_name
            )))
        }
        TileLoadOutcome::Cancelled => {
            return Err(CliError::TileUnavailable("load was cancelled".to_string()))
        }
        other => other
            .tile()
            .ok_or_else(|| CliError::TileUnavailable(other.label().to_string()))?,
    };

    println!("{}: {}", tile.tile, outcome.label());
    match &tile.source {
        TileSource::Network(url) => println!("  source:    {}", url),
        TileSource::OfflineStore(id) => println!("  source:    offline store ({})", id),
    }
    if let Some(style) = tile.style {
        println!("  displayed: {}", tile.displayed);
        println!("  size:      {}x{}", style.width, style.height);
        println!("  margin:    {}px {}px", style.margin_top, style.margin_left);
        println!("  clip:      {}", style.clip);
    }

    if let Some(path) = output {
        tile.compose(tile_size)
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| CliError::Output(e.to_string()))?;
        println!("  written:   {}", path.display());
    }

    let stats = layer.stats();
    println!("  {}", stats);
    Ok(())
}
