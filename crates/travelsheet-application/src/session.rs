//! Session context: the trip being viewed and the credential held for it.
//!
//! Built once per application lifetime and shared by the coordinator and the
//! uploader.

use std::sync::Arc;
use tokio::sync::RwLock;
use travelsheet_core::credential::{Credential, CredentialStore, resolve_launch_credential};
use travelsheet_core::error::Result;

pub struct SessionContext {
    trip_id: String,
    credential: RwLock<Credential>,
    store: Option<Arc<dyn CredentialStore>>,
}

impl SessionContext {
    /// Creates a session with an already resolved credential.
    ///
    /// Without a store, demotion only affects this process.
    pub fn new(
        trip_id: impl Into<String>,
        credential: Credential,
        store: Option<Arc<dyn CredentialStore>>,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            credential: RwLock::new(credential),
            store,
        }
    }

    /// Creates a session by applying the launch-key rule against `store`.
    pub async fn launch(
        trip_id: impl Into<String>,
        launch_key: Option<&str>,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        let trip_id = trip_id.into();
        let credential = resolve_launch_credential(store.as_ref(), &trip_id, launch_key).await?;
        tracing::info!(
            "[Session] Trip '{}' opened ({})",
            trip_id,
            if credential.is_privileged() {
                "privileged"
            } else {
                "read-only"
            }
        );
        Ok(Self::new(trip_id, credential, Some(store)))
    }

    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    pub async fn is_privileged(&self) -> bool {
        self.credential.read().await.is_privileged()
    }

    /// The key to attach to requests, when the session is privileged.
    pub async fn key(&self) -> Option<String> {
        self.credential
            .read()
            .await
            .privileged_key()
            .map(str::to_string)
    }

    /// Drops the held credential after the backend rejected it.
    ///
    /// The stored key is cleared too; a failure to do so is logged and does
    /// not undo the in-memory demotion.
    pub async fn demote(&self) {
        self.credential.write().await.clear();
        tracing::warn!("[Session] Credential rejected, trip '{}' is now read-only", self.trip_id);

        if let Some(store) = &self.store {
            if let Err(e) = store.clear(&self.trip_id).await {
                tracing::warn!("[Session] Failed to clear stored credential: {}", e);
            }
        }
    }
}
