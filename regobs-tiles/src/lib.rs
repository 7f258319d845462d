//! RegObs tiles - offline tile caching and fallback for map layers
//!
//! An [`OfflineTileLayer`](layer::OfflineTileLayer) sits in front of a tile
//! provider. Tiles fetched from the network are persisted to an offline
//! store in the background; when a fetch fails the layer substitutes the
//! stored tile or, failing that, a scaled region of the nearest available
//! ancestor tile at a coarser zoom.
//!
//! # Modules
//!
//! - [`coord`]: tile coordinates, bounds and deterministic tile ids
//! - [`provider`]: URL templates and HTTP tile providers
//! - [`cache`]: offline tile stores and the recency cache
//! - [`save_queue`]: throttled background persistence
//! - [`fallback`]: ancestor zoom walk and display styles
//! - [`exclusion`]: GeoJSON regions in which a layer requests nothing
//! - [`layer`]: the tile layer, its outcomes and substitution events
//! - [`config`]: `config.ini` handling
//! - [`app`]: wiring configured layers into a running application
//! - [`logging`]: tracing setup

pub mod app;
pub mod cache;
pub mod config;
pub mod coord;
pub mod error;
pub mod exclusion;
pub mod fallback;
pub mod layer;
pub mod logging;
pub mod provider;
pub mod save_queue;

pub use error::TileError;
