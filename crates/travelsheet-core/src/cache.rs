//! Local snapshot cache trait.

use crate::error::Result;
use crate::model::RawDataset;
use async_trait::async_trait;

/// Keeps the last successful full fetch per trip so a session can render
/// before its first network round trip.
///
/// The cache stores the backend payload verbatim; normalization happens on
/// every load.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// Returns the cached payload for `trip_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(RawDataset))`: a previous fetch was cached
    /// - `Ok(None)`: nothing cached, or the entry was unreadable
    /// - `Err(_)`: the storage itself failed
    async fn load(&self, trip_id: &str) -> Result<Option<RawDataset>>;

    /// Replaces the cached payload for `trip_id`.
    async fn store(&self, trip_id: &str, dataset: &RawDataset) -> Result<()>;
}
