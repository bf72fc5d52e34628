//! In-memory collaborators for coordinator and uploader tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use travelsheet_core::TravelError;
use travelsheet_core::api::{ApiResponse, SheetApi, WriteRequest};
use travelsheet_core::cache::SnapshotCache;
use travelsheet_core::credential::CredentialStore;
use travelsheet_core::error::Result;
use travelsheet_core::model::RawDataset;

#[derive(Default)]
pub struct MemoryCredentialStore {
    keys: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self, trip_id: &str) -> Result<Option<String>> {
        Ok(self.keys.lock().unwrap().get(trip_id).cloned())
    }

    async fn save(&self, trip_id: &str, key: &str) -> Result<()> {
        self.keys
            .lock()
            .unwrap()
            .insert(trip_id.to_string(), key.to_string());
        Ok(())
    }

    async fn clear(&self, trip_id: &str) -> Result<()> {
        self.keys.lock().unwrap().remove(trip_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCache {
    pub entries: Mutex<HashMap<String, RawDataset>>,
}

#[async_trait]
impl SnapshotCache for MemoryCache {
    async fn load(&self, trip_id: &str) -> Result<Option<RawDataset>> {
        Ok(self.entries.lock().unwrap().get(trip_id).cloned())
    }

    async fn store(&self, trip_id: &str, dataset: &RawDataset) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(trip_id.to_string(), dataset.clone());
        Ok(())
    }
}

/// Scripted backend.
///
/// Writes succeed unless a failure is registered for the record id they
/// target (`"*"` matches every write). One-shot failures apply to the next
/// matching write only. Each write takes `post_delay`. Fetches return
/// `dataset`.
#[derive(Default)]
pub struct MockApi {
    pub dataset: Mutex<RawDataset>,
    pub posts: Mutex<Vec<WriteRequest>>,
    pub failures: Mutex<HashMap<String, TravelError>>,
    pub failures_once: Mutex<HashMap<String, TravelError>>,
    pub post_delay: Mutex<Option<Duration>>,
    pub fetch_error: Mutex<Option<TravelError>>,
    pub upload_url: Mutex<Option<String>>,
    pub fetches: AtomicUsize,
}

impl MockApi {
    pub fn with_dataset(dataset: RawDataset) -> Self {
        let api = Self::default();
        *api.dataset.lock().unwrap() = dataset;
        api
    }

    pub fn fail(&self, id: &str, err: TravelError) {
        self.failures.lock().unwrap().insert(id.to_string(), err);
    }

    pub fn fail_once(&self, id: &str, err: TravelError) {
        self.failures_once
            .lock()
            .unwrap()
            .insert(id.to_string(), err);
    }

    pub fn delay_posts(&self, delay: Duration) {
        *self.post_delay.lock().unwrap() = Some(delay);
    }

    pub fn posts(&self) -> Vec<WriteRequest> {
        self.posts.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// The row a write targets, as the backend locates it.
    fn target_id(request: &WriteRequest) -> Option<String> {
        request.id.clone()
    }
}

#[async_trait]
impl SheetApi for MockApi {
    async fn fetch_all(&self, _credential: Option<&str>) -> Result<RawDataset> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fetch_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.dataset.lock().unwrap().clone())
    }

    async fn post(&self, request: &WriteRequest) -> Result<ApiResponse> {
        self.posts.lock().unwrap().push(request.clone());

        let delay = *self.post_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let target = Self::target_id(request);
        let once = target
            .as_ref()
            .and_then(|id| self.failures_once.lock().unwrap().remove(id));
        let failure = once.or_else(|| {
            let failures = self.failures.lock().unwrap();
            target
                .as_ref()
                .and_then(|id| failures.get(id).cloned())
                .or_else(|| failures.get("*").cloned())
        });
        if let Some(err) = failure {
            return Err(err);
        }

        Ok(ApiResponse {
            success: true,
            message: None,
            url: self.upload_url.lock().unwrap().clone(),
        })
    }
}
