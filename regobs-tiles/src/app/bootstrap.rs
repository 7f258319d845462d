//! Application bootstrap implementation.
//!
//! Services start in dependency order (store, save queue, layers) and shut
//! down in reverse so queued saves reach the store before it is dropped.

use std::sync::Arc;

use tracing::{info, warn};

use super::config::{AppConfig, StoreAppConfig};
use super::error::AppError;
use crate::cache::{DiskTileStore, MemoryTileStore, RecencyCache, TileStore, TileStoreClient};
use crate::config::{LayerSettings, StoreKind};
use crate::exclusion::ExclusionRegion;
use crate::layer::OfflineTileLayer;
use crate::provider::{AsyncReqwestClient, HttpTileProvider, UrlTemplate};
use crate::save_queue::SaveQueue;

/// Layer type built from configuration.
pub type AppLayer = OfflineTileLayer<HttpTileProvider<AsyncReqwestClient>>;

/// A running set of offline tile layers sharing one store and save queue.
pub struct RegObsTilesApp {
    store: Arc<dyn TileStore>,
    save_queue: Arc<SaveQueue>,
    layers: Vec<Arc<AppLayer>>,
    config: AppConfig,
}

impl RegObsTilesApp {
    /// Start the application on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened, the HTTP client
    /// cannot be built, or any layer is misconfigured. Nothing is left
    /// running on error.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        if config.layers.is_empty() {
            return Err(AppError::Config("no layers configured".to_string()));
        }

        let store = open_store(&config.store).await?;
        let client = AsyncReqwestClient::with_timeout(config.download_timeout_secs)?;

        let mut providers = Vec::with_capacity(config.layers.len());
        for layer in &config.layers {
            providers.push((build_provider(layer, client.clone())?, load_exclusion(layer)?));
        }

        let recency = Arc::new(RecencyCache::new(config.recency_capacity));
        let store_client = TileStoreClient::new(Arc::clone(&store));
        let save_queue = Arc::new(SaveQueue::start(
            config.save_queue.clone(),
            recency,
            store_client.clone(),
        ));

        let layers = config
            .layers
            .iter()
            .zip(providers)
            .map(|(settings, (provider, exclusion))| {
                let mut layer =
                    OfflineTileLayer::new(config.layer_options(settings), provider, store_client.clone())
                        .with_save_queue(Arc::clone(&save_queue));
                if let Some(region) = exclusion {
                    layer = layer.with_exclusion(region);
                }
                info!(
                    layer = %settings.name,
                    url = %settings.url,
                    min_zoom = settings.min_zoom,
                    max_zoom = settings.max_zoom,
                    "Tile layer ready"
                );
                Arc::new(layer)
            })
            .collect();

        info!(
            store = config.store.kind.as_str(),
            layers = config.layers.len(),
            "RegObs tiles started"
        );

        Ok(Self {
            store,
            save_queue,
            layers,
            config,
        })
    }

    /// Layer by name.
    pub fn layer(&self, name: &str) -> Option<Arc<AppLayer>> {
        self.layers.iter().find(|l| l.name() == name).cloned()
    }

    /// All layers in configuration order.
    pub fn layers(&self) -> &[Arc<AppLayer>] {
        &self.layers
    }

    pub fn store(&self) -> &Arc<dyn TileStore> {
        &self.store
    }

    pub fn save_queue(&self) -> &Arc<SaveQueue> {
        &self.save_queue
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Drain pending saves and stop the save worker.
    pub async fn shutdown(self) {
        info!("Shutting down RegObs tiles");
        self.save_queue.shutdown().await;

        let stats = self.save_queue.stats();
        info!(saved = stats.saved, failed = stats.failed, "Save queue drained");
        if stats.failed > 0 {
            warn!(failed = stats.failed, "Some tiles could not be persisted");
        }
    }
}

async fn open_store(config: &StoreAppConfig) -> Result<Arc<dyn TileStore>, AppError> {
    match config.kind {
        StoreKind::Disk => {
            let store = DiskTileStore::open(config.directory.clone()).await?;
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            info!(max_size = config.memory_size_bytes, "Memory tile store created");
            Ok(Arc::new(MemoryTileStore::new(config.memory_size_bytes)))
        }
    }
}

fn build_provider(
    layer: &LayerSettings,
    client: AsyncReqwestClient,
) -> Result<HttpTileProvider<AsyncReqwestClient>, AppError> {
    let template_error = |source| AppError::Template {
        layer: layer.name.clone(),
        source,
    };

    let mut template = UrlTemplate::parse(&layer.url).map_err(template_error)?;
    if let Some(subdomains) = &layer.subdomains {
        template = template
            .with_subdomains(subdomains.clone())
            .map_err(template_error)?;
    }
    let template = template.with_tms(layer.tms).with_retina(layer.retina);

    let mut provider =
        HttpTileProvider::new(template, client).with_zoom_range(layer.min_zoom, layer.max_zoom);
    if let Some(bounds) = layer.bounds {
        provider = provider.with_bounds(bounds);
    }
    Ok(provider)
}

fn load_exclusion(layer: &LayerSettings) -> Result<Option<ExclusionRegion>, AppError> {
    let Some(path) = &layer.exclusion else {
        return Ok(None);
    };
    let region = ExclusionRegion::from_file(path).map_err(|source| AppError::Exclusion {
        layer: layer.name.clone(),
        source,
    })?;
    info!(layer = %layer.name, path = %path.display(), "Exclusion region loaded");
    Ok(Some(region))
}
