//! Tile providers.
//!
//! A provider knows how to build the URL of a tile, fetch it, and say
//! whether it serves a given tile at all. [`HttpTileProvider`] covers any
//! XYZ/TMS source described by a [`UrlTemplate`].

mod http;
mod template;
mod types;
mod xyz;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS, USER_AGENT};
pub use template::{TemplateError, UrlTemplate, DEFAULT_SUBDOMAINS};
pub use types::{ProviderError, TileProvider};
pub use xyz::HttpTileProvider;

#[cfg(test)]
pub(crate) use http::tests::MockAsyncHttpClient;
