//! The offline-capable tile layer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use image::DynamicImage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::cache::TileStoreClient;
use crate::coord::{compute_tile_id, tile_bounds, TileCoord, TileId};
use crate::error::TileError;
use crate::exclusion::{is_tile_excluded, ExclusionRegion};
use crate::fallback::{FallbackState, FallbackStep, TileStyle};
use crate::provider::TileProvider;
use crate::save_queue::{SaveDecision, SaveQueue};

use super::event::{FallbackSource, TilePhase, TileSubstituted};
use super::grid::TileRange;
use super::options::LayerOptions;
use super::stats::{LayerMetrics, LayerStatsSnapshot};
use super::tile::{LoadedTile, TileLoadOutcome, TileSource};

/// Capacity of the substitution event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

struct InFlight {
    generation: u64,
    cancel: CancellationToken,
    phase: TilePhase,
    fallback: Option<FallbackState>,
}

/// Tile layer adding an offline store and ancestor fallback to a provider.
///
/// Every tile load runs its own chain:
///
/// ```text
/// fetch(url) ──ok──► Loaded (offered to the save queue)
///    │ err
///    ▼
/// store.lookup(id) ──hit──► SubstitutedFromStore
///    │ miss (or stored image does not decode)
///    ▼
/// loop: advance zoom ──z-Δ<1──► Exhausted
///    │                   ▲
///    ▼                   │ err
/// fetch(ancestor url) ───┘
///    │ ok
///    ▼
/// SubstitutedFromAncestor
/// ```
///
/// Chains for different tiles run concurrently and complete in any order;
/// steps of one chain are strictly sequential. Per-tile state lives in a
/// map keyed by tile id and is removed when the chain ends or the tile is
/// discarded.
pub struct OfflineTileLayer<P: TileProvider> {
    options: LayerOptions,
    provider: P,
    store: TileStoreClient,
    save_queue: Option<Arc<SaveQueue>>,
    exclusion: Option<ExclusionRegion>,
    events: broadcast::Sender<TileSubstituted>,
    in_flight: DashMap<TileId, InFlight>,
    next_generation: AtomicU64,
    metrics: LayerMetrics,
}

impl<P: TileProvider> OfflineTileLayer<P> {
    pub fn new(options: LayerOptions, provider: P, store: TileStoreClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            options,
            provider,
            store,
            save_queue: None,
            exclusion: None,
            events,
            in_flight: DashMap::new(),
            next_generation: AtomicU64::new(0),
            metrics: LayerMetrics::new(),
        }
    }

    /// Persist displayed tiles through `queue`.
    pub fn with_save_queue(mut self, queue: Arc<SaveQueue>) -> Self {
        self.save_queue = Some(queue);
        self
    }

    /// Suppress tiles inside `region`.
    pub fn with_exclusion(mut self, region: ExclusionRegion) -> Self {
        self.exclusion = Some(region);
        self
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Id under which this layer stores `coord`.
    pub fn tile_id(&self, coord: &TileCoord) -> TileId {
        compute_tile_id(&self.options.name, coord)
    }

    pub fn tile_url(&self, coord: &TileCoord) -> String {
        self.provider.tile_url(coord)
    }

    /// Whether the layer requests `coord` at all.
    ///
    /// False when the provider does not serve it or its bounds lie entirely
    /// inside the exclusion region.
    pub fn is_valid_tile(&self, coord: &TileCoord) -> bool {
        if !self.provider.is_valid_tile(coord) {
            return false;
        }
        match &self.exclusion {
            Some(region) => !is_tile_excluded(&tile_bounds(coord), region),
            None => true,
        }
    }

    /// Tiles to request for a viewport, including the edge buffer.
    ///
    /// Invalid tiles are left out.
    pub fn tiles_for_viewport(
        &self,
        center_lat: f64,
        center_lon: f64,
        zoom: u8,
        width: u32,
        height: u32,
    ) -> Vec<TileCoord> {
        TileRange::for_viewport(
            center_lat,
            center_lon,
            zoom,
            width,
            height,
            self.options.tile_size,
            self.options.edge_buffer_tiles,
        )
        .tiles()
        .into_iter()
        .filter(|coord| self.is_valid_tile(coord))
        .collect()
    }

    /// Receive "tile substituted" notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<TileSubstituted> {
        self.events.subscribe()
    }

    pub fn stats(&self) -> LayerStatsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of tiles currently loading.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Fallback progress of an in-flight tile.
    pub fn fallback_state(&self, coord: &TileCoord) -> Option<FallbackState> {
        self.in_flight
            .get(&self.tile_id(coord))
            .and_then(|entry| entry.fallback)
    }

    /// Phase of an in-flight tile.
    pub fn tile_phase(&self, coord: &TileCoord) -> Option<TilePhase> {
        self.in_flight
            .get(&self.tile_id(coord))
            .map(|entry| entry.phase)
    }

    /// Abandon a tile's load, e.g. after it scrolled out of view.
    ///
    /// The pending `load_tile` returns [`TileLoadOutcome::Cancelled`] and
    /// produces no further events or writes. Returns `false` if the tile was
    /// not loading.
    pub fn discard_tile(&self, coord: &TileCoord) -> bool {
        match self.in_flight.remove(&self.tile_id(coord)) {
            Some((id, entry)) => {
                entry.cancel.cancel();
                trace!(id = %id, "Tile discarded");
                true
            }
            None => false,
        }
    }

    /// Load many tiles concurrently.
    ///
    /// Outcomes are returned in input order.
    pub async fn load_tiles(&self, coords: &[TileCoord]) -> Vec<TileLoadOutcome> {
        join_all(coords.iter().map(|coord| self.load_tile(*coord))).await
    }

    /// Load one tile, falling back as needed.
    ///
    /// A second load of a tile that is still loading supersedes the first,
    /// which returns [`TileLoadOutcome::Cancelled`].
    pub async fn load_tile(&self, coord: TileCoord) -> TileLoadOutcome {
        if !self.is_valid_tile(&coord) {
            trace!(z = coord.z(), x = coord.x(), y = coord.y(), layer = %self.options.name, "Skipping invalid tile");
            self.metrics.invalid_tile();
            return TileLoadOutcome::Invalid;
        }

        let id = self.tile_id(&coord);
        let (cancel, generation) = self.register(&id);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => TileLoadOutcome::Cancelled,
            outcome = self.run_chain(&id, coord, generation) => outcome,
        };

        self.in_flight
            .remove_if(&id, |_, entry| entry.generation == generation);

        match &outcome {
            TileLoadOutcome::Loaded(_) => self.metrics.network_loaded(),
            TileLoadOutcome::SubstitutedFromStore(_) => self.metrics.store_substituted(),
            TileLoadOutcome::SubstitutedFromAncestor(_) => self.metrics.ancestor_substituted(),
            TileLoadOutcome::Exhausted(error) => {
                debug!(id = %id, error = %error, "Tile fallback exhausted");
                self.metrics.chain_exhausted();
            }
            TileLoadOutcome::Cancelled => self.metrics.load_cancelled(),
            TileLoadOutcome::Invalid => {}
        }

        outcome
    }

    fn register(&self, id: &TileId) -> (CancellationToken, u64) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let previous = self.in_flight.insert(
            id.clone(),
            InFlight {
                generation,
                cancel: cancel.clone(),
                phase: TilePhase::Requesting,
                fallback: None,
            },
        );
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }
        (cancel, generation)
    }

    fn set_progress(&self, id: &TileId, generation: u64, phase: TilePhase, state: &FallbackState) {
        if let Some(mut entry) = self.in_flight.get_mut(id) {
            if entry.generation == generation {
                entry.phase = phase;
                entry.fallback = Some(*state);
            }
        }
    }

    async fn run_chain(&self, id: &TileId, coord: TileCoord, generation: u64) -> TileLoadOutcome {
        let url = self.provider.tile_url(&coord);

        let error = match self.fetch_image(&url).await {
            Ok(image) => {
                self.offer_save(id, &url, &image);
                return TileLoadOutcome::Loaded(LoadedTile {
                    tile: id.clone(),
                    coord,
                    displayed: coord,
                    source: TileSource::Network(url),
                    image,
                    style: None,
                });
            }
            Err(error) => error,
        };
        debug!(id = %id, error = %error, "Tile load failed, starting fallback");
        self.metrics.fetch_failed();

        let mut state = FallbackState::new(coord);
        let mut current_src = url.clone();
        let mut current_style: Option<TileStyle> = None;

        loop {
            if state.should_try_offline_store() {
                state.mark_offline_store_tried();
                self.set_progress(id, generation, TilePhase::TryingOfflineStore, &state);

                let lookup_id = self.tile_id(&state.current());
                if let Some(record) = self.store.lookup(&lookup_id).await {
                    let origin = format!("offline:{}", lookup_id);
                    match decode_image(&origin, record.image_data).await {
                        Ok(image) => {
                            self.emit(TileSubstituted {
                                tile: id.clone(),
                                url: url.clone(),
                                url_missing: current_src,
                                url_fallback: FallbackSource::OfflineStore(lookup_id.clone()),
                                style: current_style,
                            });
                            return TileLoadOutcome::SubstitutedFromStore(LoadedTile {
                                tile: id.clone(),
                                coord,
                                displayed: state.current(),
                                source: TileSource::OfflineStore(lookup_id),
                                image,
                                style: current_style,
                            });
                        }
                        Err(error) => {
                            warn!(id = %lookup_id, error = %error, "Stored tile is not displayable");
                            current_src = origin;
                        }
                    }
                }
            }

            let (ancestor, style) = match state.advance(self.options.tile_size, self.options.offline_lookup) {
                FallbackStep::Ancestor { coord, style } => (coord, style),
                FallbackStep::Exhausted => {
                    return TileLoadOutcome::Exhausted(TileError::FallbackExhausted {
                        tile: id.clone(),
                        attempts: state.fallback_zoom_delta().saturating_sub(1),
                    });
                }
            };
            self.set_progress(id, generation, TilePhase::TryingAncestorZoom, &state);

            if !self.provider.supports_zoom(ancestor.z()) {
                trace!(id = %id, zoom = ancestor.z(), "Ancestor zoom not served, skipping");
                continue;
            }

            let ancestor_url = self.provider.tile_url(&ancestor);
            self.emit(TileSubstituted {
                tile: id.clone(),
                url: url.clone(),
                url_missing: std::mem::replace(&mut current_src, ancestor_url.clone()),
                url_fallback: FallbackSource::Url(ancestor_url.clone()),
                style: Some(style),
            });
            current_style = Some(style);

            match self.fetch_image(&ancestor_url).await {
                Ok(image) => {
                    if self.options.persist_ancestor_tiles {
                        self.offer_save(&self.tile_id(&ancestor), &ancestor_url, &image);
                    }
                    return TileLoadOutcome::SubstitutedFromAncestor(LoadedTile {
                        tile: id.clone(),
                        coord,
                        displayed: ancestor,
                        source: TileSource::Network(ancestor_url),
                        image,
                        style: Some(style),
                    });
                }
                Err(error) => {
                    debug!(id = %id, zoom = ancestor.z(), error = %error, "Ancestor tile failed");
                    self.metrics.fetch_failed();
                }
            }
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<Arc<DynamicImage>, TileError> {
        let data = self
            .provider
            .fetch(url)
            .await
            .map_err(|e| TileError::network(url, e))?;
        decode_image(url, data).await
    }

    fn offer_save(&self, id: &TileId, source: &str, image: &Arc<DynamicImage>) {
        if !self.options.buffer_offline {
            return;
        }
        if let Some(queue) = &self.save_queue {
            if queue.offer(id, source, Arc::clone(image)) == SaveDecision::Queued {
                self.metrics.save_queued();
            }
        }
    }

    fn emit(&self, event: TileSubstituted) {
        trace!(
            id = %event.tile,
            missing = %event.url_missing,
            fallback = %event.url_fallback,
            "Tile substituted"
        );
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Decode a payload; failure means the tile could not be rendered.
async fn decode_image(origin: &str, data: Vec<u8>) -> Result<Arc<DynamicImage>, TileError> {
    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&data)).await;
    match decoded {
        Ok(Ok(image)) => Ok(Arc::new(image)),
        Ok(Err(e)) => Err(TileError::ImageDecode {
            origin: origin.to_string(),
            reason: e.to_string(),
        }),
        Err(e) => Err(TileError::ImageDecode {
            origin: origin.to_string(),
            reason: e.to_string(),
        }),
    }
}
