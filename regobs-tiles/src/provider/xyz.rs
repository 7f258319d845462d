//! Template-driven XYZ tile provider.

use crate::coord::{tile_bounds, LatLngBounds, TileCoord, MAX_ZOOM};

use super::http::AsyncHttpClient;
use super::template::UrlTemplate;
use super::types::{ProviderError, TileProvider};

/// Tile provider for any `{z}/{x}/{y}` style HTTP source.
///
/// A tile is valid when its zoom is within `[min_zoom, max_zoom]` and,
/// if bounds are set, the tile's extent intersects them.
pub struct HttpTileProvider<C: AsyncHttpClient> {
    template: UrlTemplate,
    http_client: C,
    min_zoom: u8,
    max_zoom: u8,
    bounds: Option<LatLngBounds>,
}

impl<C: AsyncHttpClient> HttpTileProvider<C> {
    /// Creates a provider serving every zoom level.
    pub fn new(template: UrlTemplate, http_client: C) -> Self {
        Self {
            template,
            http_client,
            min_zoom: 0,
            max_zoom: MAX_ZOOM,
            bounds: None,
        }
    }

    /// Restrict the served zoom range.
    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom.min(MAX_ZOOM);
        self.max_zoom = max_zoom.min(MAX_ZOOM).max(self.min_zoom);
        self
    }

    /// Restrict tiles to those touching `bounds`.
    pub fn with_bounds(mut self, bounds: LatLngBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// The HTTP client used for fetches.
    pub fn http_client(&self) -> &C {
        &self.http_client
    }

    /// The URL template in use.
    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }
}

impl<C: AsyncHttpClient> TileProvider for HttpTileProvider<C> {
    fn tile_url(&self, coord: &TileCoord) -> String {
        self.template.expand(coord)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.http_client.get(url).await
    }

    fn is_valid_tile(&self, coord: &TileCoord) -> bool {
        if !self.supports_zoom(coord.z()) {
            return false;
        }
        match &self.bounds {
            Some(bounds) => bounds.intersects(&tile_bounds(coord)),
            None => true,
        }
    }

    fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::tests::MockAsyncHttpClient;

    fn provider() -> HttpTileProvider<MockAsyncHttpClient> {
        let template = UrlTemplate::parse("https://tiles.example.com/{z}/{x}/{y}.png").unwrap();
        HttpTileProvider::new(
            template,
            MockAsyncHttpClient::new().with_response("https://tiles.example.com/1/0/0.png", vec![7]),
        )
    }

    #[test]
    fn test_tile_url() {
        let p = provider();
        let coord = TileCoord::new(5, 10, 12).unwrap();
        assert_eq!(p.tile_url(&coord), "https://tiles.example.com/5/10/12.png");
    }

    #[tokio::test]
    async fn test_fetch_delegates_to_client() {
        let p = provider();
        assert_eq!(p.fetch("https://tiles.example.com/1/0/0.png").await, Ok(vec![7]));
        assert!(p.fetch("https://tiles.example.com/1/1/0.png").await.is_err());
    }

    #[test]
    fn test_zoom_range_validity() {
        let p = provider().with_zoom_range(3, 10);
        assert!(!p.is_valid_tile(&TileCoord::new(2, 0, 0).unwrap()));
        assert!(p.is_valid_tile(&TileCoord::new(3, 0, 0).unwrap()));
        assert!(p.is_valid_tile(&TileCoord::new(10, 0, 0).unwrap()));
        assert!(!p.is_valid_tile(&TileCoord::new(11, 0, 0).unwrap()));
    }

    #[test]
    fn test_inverted_zoom_range_clamped() {
        let p = provider().with_zoom_range(10, 3);
        assert_eq!(p.min_zoom(), 10);
        assert_eq!(p.max_zoom(), 10);
    }

    #[test]
    fn test_bounds_validity() {
        // Norway-ish
        let bounds = LatLngBounds::new(57.0, 4.0, 72.0, 32.0);
        let p = provider().with_bounds(bounds);
        // Oslo
        assert!(p.is_valid_tile(&TileCoord::new(10, 542, 297).unwrap()));
        // Null Island
        assert!(!p.is_valid_tile(&TileCoord::new(10, 512, 512).unwrap()));
        // zoom 0 covers everything
        assert!(p.is_valid_tile(&TileCoord::new(0, 0, 0).unwrap()));
    }
}
