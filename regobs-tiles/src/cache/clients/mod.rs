//! Tolerant store clients.
//!
//! The tile layer never fails because storage is unavailable. These clients
//! wrap an `Arc<dyn TileStore>` and turn backend errors into "not found" /
//! "not written" outcomes with a logged warning.
//!
//! ```text
//! ┌──────────────────────┐
//! │  TileStoreClient     │  StoreError → None / false + warn!
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │  Arc<dyn TileStore>  │  memory, disk, ...
//! └──────────────────────┘
//! ```

mod tile;

pub use tile::TileStoreClient;
