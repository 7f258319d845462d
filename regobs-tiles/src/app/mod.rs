//! Application bootstrap and lifecycle management.
//!
//! [`RegObsTilesApp`] wires the offline store, the recency cache, the save
//! queue and one [`OfflineTileLayer`](crate::layer::OfflineTileLayer) per
//! configured layer, and shuts them down in order.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      RegObsTilesApp                       │
//! │                                                           │
//! │  1. TileStore (disk | memory) ──► TileStoreClient         │
//! │  2. RecencyCache + SaveQueue worker                       │
//! │  3. OfflineTileLayer per [layer.*]                        │
//! │       └── HttpTileProvider<AsyncReqwestClient>            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use regobs_tiles::app::{AppConfig, RegObsTilesApp};
//!
//! let app = RegObsTilesApp::start(config).await?;
//! let layer = app.layer("topo").unwrap();
//! let outcome = layer.load_tile(coord).await;
//! app.shutdown().await;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::{AppLayer, RegObsTilesApp};
pub use config::{AppConfig, StoreAppConfig};
pub use error::AppError;
