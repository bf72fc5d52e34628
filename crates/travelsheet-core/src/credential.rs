//! The opaque access credential and its per-trip storage.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Whether `credential` grants elevated access.
///
/// Any non-blank value except the literal `"null"` counts.
pub fn is_privileged(credential: Option<&str>) -> bool {
    credential
        .map(str::trim)
        .is_some_and(|key| !key.is_empty() && key != "null")
}

/// The credential held by a session.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(Option<String>);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_privileged(&self) -> bool {
        is_privileged(self.as_deref())
    }

    /// The key to send, only when it grants elevated access.
    pub fn privileged_key(&self) -> Option<&str> {
        self.as_deref().filter(|_| self.is_privileged())
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("Credential(<redacted>)"),
            None => f.write_str("Credential(None)"),
        }
    }
}

/// Per-trip credential persistence.
///
/// # Security Note
///
/// Implementations should keep the backing file readable by the owner only
/// and never log the stored key.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self, trip_id: &str) -> Result<Option<String>>;

    async fn save(&self, trip_id: &str, key: &str) -> Result<()>;

    /// Forgets the trip's key. Succeeds when nothing was stored.
    async fn clear(&self, trip_id: &str) -> Result<()>;
}

/// Applies the launch rule and returns the credential the session starts with.
///
/// A non-blank `launch_key` is stored for the trip. A blank or absent one
/// clears whatever was stored, so the key must accompany every launch.
pub async fn resolve_launch_credential(
    store: &dyn CredentialStore,
    trip_id: &str,
    launch_key: Option<&str>,
) -> Result<Credential> {
    match launch_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => {
            store.save(trip_id, key).await?;
            tracing::info!("[Credential] Stored launch key for trip '{}'", trip_id);
        }
        None => {
            store.clear(trip_id).await?;
            tracing::debug!("[Credential] No launch key for trip '{}', cleared", trip_id);
        }
    }

    Ok(store
        .load(trip_id)
        .await?
        .map(Credential::new)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        keys: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl CredentialStore for MemoryStore {
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

    #[test]
    fn test_is_privileged() {
        assert!(is_privileged(Some("abc")));
        assert!(!is_privileged(Some("   ")));
        assert!(!is_privileged(Some("null")));
        assert!(!is_privileged(None));
        assert!(!Credential::new(" null ").is_privileged());
    }

    #[test]
    fn test_debug_redacts_key() {
        let shown = format!("{:?}", Credential::new("top-secret"));
        assert!(!shown.contains("top-secret"));
    }

    #[tokio::test]
    async fn test_launch_key_is_stored() {
        let store = MemoryStore::default();
        let credential = resolve_launch_credential(&store, "kyoto", Some("k1"))
            .await
            .unwrap();
        assert_eq!(credential.as_deref(), Some("k1"));
        assert_eq!(store.load("kyoto").await.unwrap().as_deref(), Some("k1"));
    }

    #[tokio::test]
    async fn test_missing_or_blank_launch_key_clears() {
        let store = MemoryStore::default();
        store.save("kyoto", "old").await.unwrap();
        store.save("osaka", "other").await.unwrap();

        let credential = resolve_launch_credential(&store, "kyoto", None).await.unwrap();
        assert!(!credential.is_privileged());

        store.save("kyoto", "old").await.unwrap();
        let credential = resolve_launch_credential(&store, "kyoto", Some(" ")).await.unwrap();
        assert!(credential.as_deref().is_none());
        assert_eq!(store.load("osaka").await.unwrap().as_deref(), Some("other"));
    }
}
