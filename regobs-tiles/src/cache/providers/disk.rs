//! On-disk tile store.
//!
//! Each record is serialized with bincode into its own file. Files are
//! written atomically (temp file + rename) so a crash never leaves a
//! half-written record behind. Every write uses its own temp file, so
//! concurrent writers of one id, in this or another process, never
//! interleave.
//!
//! # File Layout
//!
//! ```text
//! {store_dir}/{hash[0..2]}/{hash}.tile
//! ```
//!
//! `hash` is the SHA-256 of the tile id. It is stable across releases and
//! platforms, which matters because the directory outlives the process.
//!
//! Eviction is not handled here; the directory can be cleared with
//! [`clear_disk_store`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::cache::traits::{BoxFuture, StoreError, TileRecord, TileStore};
use crate::coord::TileId;

const RECORD_EXTENSION: &str = "tile";
const TEMP_EXTENSION: &str = "tmp";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `{record}.{pid}.{n}.tmp`, unique across writers and processes.
fn unique_temp_path(path: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}.{}.{}", std::process::id(), n, TEMP_EXTENSION));
    PathBuf::from(name)
}

/// File-per-tile offline store.
pub struct DiskTileStore {
    directory: PathBuf,
}

impl DiskTileStore {
    /// Open (and create if needed) a store rooted at `directory`.
    pub async fn open(directory: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await?;
        info!(dir = %directory.display(), "Disk tile store opened");
        Ok(Self { directory })
    }

    /// Root directory of the store.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Safe, stable filename for a tile id.
    fn id_to_filename(id: &TileId) -> String {
        let digest = Sha256::digest(id.as_str().as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        format!("{}.{}", hex, RECORD_EXTENSION)
    }

    /// Full path of the record file for `id`.
    fn id_path(&self, id: &TileId) -> PathBuf {
        let filename = Self::id_to_filename(id);
        self.directory.join(&filename[..2]).join(filename)
    }
}

impl TileStore for DiskTileStore {
    fn get(&self, id: &TileId) -> BoxFuture<'_, Result<Option<TileRecord>, StoreError>> {
        let path = self.id_path(id);
        let id = id.clone();
        Box::pin(async move {
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(StoreError::Io(e)),
            };

            let record: TileRecord =
                bincode::deserialize(&bytes).map_err(|e| StoreError::Corrupt {
                    id: id.to_string(),
                    reason: e.to_string(),
                })?;

            // Guard against the (astronomically unlikely) hash collision
            if record.id != id {
                return Ok(None);
            }
            Ok(Some(record))
        })
    }

    fn put(&self, id: &TileId, image_data: Vec<u8>) -> BoxFuture<'_, Result<(), StoreError>> {
        let path = self.id_path(id);
        let id = id.clone();
        Box::pin(async move {
            if tokio::fs::try_exists(&path).await? {
                debug!(id = %id, "Tile already stored, skipping write");
                return Ok(());
            }
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let record = TileRecord::new(id.clone(), image_data);
            let bytes = bincode::serialize(&record).map_err(|e| StoreError::Corrupt {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

            // Write atomically via a temp file private to this writer
            let temp_path = unique_temp_path(&path);
            if let Err(e) = tokio::fs::write(&temp_path, &bytes).await {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(StoreError::Io(e));
            }
            if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
                let _ = tokio::fs::remove_file(&temp_path).await;
                if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    debug!(id = %id, "Tile stored by a concurrent writer");
                    return Ok(());
                }
                return Err(StoreError::Io(e));
            }
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "disk"
    }
}

/// File and byte counts for an on-disk store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskStoreStats {
    /// Number of stored tiles.
    pub files: u64,
    /// Total bytes on disk.
    pub bytes: u64,
}

/// Count the tiles stored under `directory`.
///
/// A missing directory is reported as empty.
pub fn disk_store_stats(directory: &Path) -> std::io::Result<DiskStoreStats> {
    let mut stats = DiskStoreStats::default();
    if !directory.exists() {
        return Ok(stats);
    }
    visit_records(directory, &mut |path| {
        stats.files += 1;
        stats.bytes += std::fs::metadata(path)?.len();
        Ok(())
    })?;
    Ok(stats)
}

/// Delete every stored tile under `directory`.
///
/// Returns what was removed.
pub fn clear_disk_store(directory: &Path) -> std::io::Result<DiskStoreStats> {
    let mut removed = DiskStoreStats::default();
    if !directory.exists() {
        return Ok(removed);
    }
    visit_records(directory, &mut |path| {
        let len = std::fs::metadata(path)?.len();
        std::fs::remove_file(path)?;
        removed.files += 1;
        removed.bytes += len;
        Ok(())
    })?;

    // Remove now-empty shard directories
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            let _ = std::fs::remove_dir(&path);
        }
    }
    Ok(removed)
}

fn visit_records(
    dir: &Path,
    f: &mut dyn FnMut(&Path) -> std::io::Result<()>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            visit_records(&path, f)?;
        } else if path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) {
            f(&path)?;
        }
    }
    Ok(())
}
