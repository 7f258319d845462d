//! Background writer draining the save queue.

use std::io::Cursor;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{RecencyCache, TileStoreClient};

use super::{SaveCounters, SaveQueueConfig, SaveRequest, TileImageFormat};

/// Runs until shutdown is signalled and every queued request is written.
pub(super) async fn run(
    mut request_rx: mpsc::Receiver<SaveRequest>,
    store: TileStoreClient,
    recency: Arc<RecencyCache>,
    config: SaveQueueConfig,
    counters: Arc<SaveCounters>,
    shutdown: CancellationToken,
) {
    let batch_size = config.batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                break;
            }

            received = request_rx.recv_many(&mut batch, batch_size) => {
                if received == 0 {
                    return;
                }
                write_batch(&mut batch, &store, &recency, &counters, config.image_format).await;
                if !config.throttle.is_zero() {
                    tokio::time::sleep(config.throttle).await;
                }
            }
        }
    }

    // Drain what was accepted before shutdown
    request_rx.close();
    while let Ok(request) = request_rx.try_recv() {
        batch.push(request);
        if batch.len() >= batch_size {
            write_batch(&mut batch, &store, &recency, &counters, config.image_format).await;
        }
    }
    write_batch(&mut batch, &store, &recency, &counters, config.image_format).await;
}

async fn write_batch(
    batch: &mut Vec<SaveRequest>,
    store: &TileStoreClient,
    recency: &RecencyCache,
    counters: &SaveCounters,
    format: TileImageFormat,
) {
    if batch.is_empty() {
        return;
    }
    debug!(count = batch.len(), "Writing save batch");

    for request in batch.drain(..) {
        let image = Arc::clone(&request.image);
        let encoded = tokio::task::spawn_blocking(move || encode_tile(&image, format)).await;

        let data = match encoded {
            Ok(Ok(data)) => data,
            Ok(Err(e)) => {
                warn!(id = %request.id, error = %e, "Failed to encode tile for offline save");
                record_failure(&request, recency, counters);
                continue;
            }
            Err(e) => {
                warn!(id = %request.id, error = %e, "Tile encoding task failed");
                record_failure(&request, recency, counters);
                continue;
            }
        };

        if store.save(&request.id, data).await {
            counters.saved.fetch_add(1, Ordering::Relaxed);
        } else {
            record_failure(&request, recency, counters);
        }
    }
}

/// Unmark a failed tile so the next display offers it again.
fn record_failure(request: &SaveRequest, recency: &RecencyCache, counters: &SaveCounters) {
    recency.forget(&request.id);
    counters.failed.fetch_add(1, Ordering::Relaxed);
}

/// Re-encode displayed pixels in the configured format.
pub(crate) fn encode_tile(
    image: &DynamicImage,
    format: TileImageFormat,
) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    match format {
        TileImageFormat::Png => image.write_to(&mut buffer, ImageFormat::Png)?,
        // JPEG has no alpha channel
        TileImageFormat::Jpeg => {
            DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buffer, ImageFormat::Jpeg)?
        }
    }
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_encode_png_keeps_pixels() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(1, 0, Rgba([200, 10, 20, 255]));
        let data = encode_tile(&DynamicImage::ImageRgba8(img), TileImageFormat::Png).unwrap();

        assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&data).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(1, 0), &Rgba([200, 10, 20, 255]));
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 200, 30, 128]));
        let data = encode_tile(&DynamicImage::ImageRgba8(img), TileImageFormat::Jpeg).unwrap();

        let decoded = image::load_from_memory_with_format(&data, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
        assert!(!decoded.color().has_alpha());
    }
}
