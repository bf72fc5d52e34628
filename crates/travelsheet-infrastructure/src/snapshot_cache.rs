//! File-backed snapshot cache.

use crate::paths::TravelPaths;
use crate::storage::AtomicFile;
use async_trait::async_trait;
use std::path::PathBuf;
use travelsheet_core::cache::SnapshotCache;
use travelsheet_core::error::Result;
use travelsheet_core::model::RawDataset;

/// Stores each trip's last fetch as `cache_<trip>.json` in one directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotCache {
    dir: PathBuf,
}

impl FileSnapshotCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Uses the platform cache directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(TravelPaths::cache_dir()?))
    }

    fn file(&self, trip_id: &str) -> AtomicFile<RawDataset> {
        AtomicFile::json(TravelPaths::cache_file(&self.dir, trip_id))
    }
}

#[async_trait]
impl SnapshotCache for FileSnapshotCache {
    async fn load(&self, trip_id: &str) -> Result<Option<RawDataset>> {
        match self.file(trip_id).load() {
            Ok(dataset) => Ok(dataset),
            Err(e) if e.is_parse() => {
                tracing::warn!(
                    "[SnapshotCache] Ignoring unreadable cache for trip '{}': {}",
                    trip_id,
                    e
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, trip_id: &str, dataset: &RawDataset) -> Result<()> {
        self.file(trip_id).save(dataset)?;
        tracing::debug!("[SnapshotCache] Cached dataset for trip '{}'", trip_id);
        Ok(())
    }
}
