//! `id` and `range`: inspect tile identifiers and viewport coverage.

use std::path::Path;

use clap::Args;
use regobs_tiles::app::{AppConfig, RegObsTilesApp, StoreAppConfig};
use regobs_tiles::config::{ConfigFile, DEFAULT_LAYER_NAME};
use regobs_tiles::coord::{compute_tile_id, TileCoord};

use super::{build_runtime, load_config};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct IdArgs {
    /// Zoom level
    pub z: u8,
    /// Tile column
    pub x: u32,
    /// Tile row
    pub y: u32,

    /// Layer name
    #[arg(short, long, default_value = DEFAULT_LAYER_NAME)]
    pub layer: String,
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    /// Latitude of the viewport centre
    #[arg(allow_negative_numbers = true)]
    pub lat: f64,
    /// Longitude of the viewport centre
    #[arg(allow_negative_numbers = true)]
    pub lon: f64,
    /// Zoom level
    pub zoom: u8,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 768)]
    pub height: u32,

    /// Layer name
    #[arg(short, long, default_value = DEFAULT_LAYER_NAME)]
    pub layer: String,
}

/// Print the offline store id of a tile.
pub fn run_id(args: IdArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    require_layer(&config, &args.layer)?;
    let coord = TileCoord::new(args.z, args.x, args.y)?;
    println!("{}", compute_tile_id(&args.layer, &coord));
    Ok(())
}

/// Print the tiles a viewport requests, nearest the centre first.
pub fn run_range(args: RangeArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    require_layer(&config, &args.layer)?;

    // Nothing is fetched, so keep the configured store untouched.
    let mut app_config = AppConfig::from_config_file(&config);
    app_config.store = StoreAppConfig::memory(0);

    let runtime = build_runtime()?;
    let tiles = runtime.block_on(async {
        let app = RegObsTilesApp::start(app_config).await?;
        let tiles = app
            .layer(&args.layer)
            .map(|layer| {
                layer
                    .tiles_for_viewport(args.lat, args.lon, args.zoom, args.width, args.height)
                    .into_iter()
                    .map(|coord| (coord, layer.tile_id(&coord)))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        app.shutdown().await;
        Ok::<_, CliError>(tiles)
    })?;

    println!(
        "{} tiles at zoom {} (edge buffer {})",
        tiles.len(),
        args.zoom,
        config.tiles.edge_buffer_tiles
    );
    for (coord, id) in tiles {
        println!("  {:<14} {}", coord.to_string(), id);
    }
    Ok(())
}

fn require_layer(config: &ConfigFile, name: &str) -> Result<(), CliError> {
    match config.layer(name) {
        Some(_) => Ok(()),
        None => Err(CliError::UnknownLayer(name.to_string())),
    }
}
