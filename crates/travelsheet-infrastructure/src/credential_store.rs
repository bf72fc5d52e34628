//! File-backed credential store.

use crate::paths::TravelPaths;
use crate::storage::AtomicFile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use travelsheet_core::credential::CredentialStore;
use travelsheet_core::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    keys: BTreeMap<String, String>,
}

/// Keeps one key per trip in `credentials.toml`.
///
/// The file is created owner read/write only; the key is never on disk with
/// wider bits.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> Result<Self> {
        Ok(Self::new(TravelPaths::credentials_file()?))
    }

    fn file(&self) -> AtomicFile<CredentialFile> {
        AtomicFile::toml(self.path.clone()).with_mode(0o600)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self, trip_id: &str) -> Result<Option<String>> {
        let stored = self.file().load()?.unwrap_or_default();
        Ok(stored.keys.get(trip_id).cloned())
    }

    async fn save(&self, trip_id: &str, key: &str) -> Result<()> {
        self.file().update(CredentialFile::default(), |stored| {
            stored.keys.insert(trip_id.to_string(), key.to_string());
        })?;
        Ok(())
    }

    async fn clear(&self, trip_id: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.file().update(CredentialFile::default(), |stored| {
            stored.keys.remove(trip_id);
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_keys_are_per_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("credentials.toml"));

        store.save("kyoto", "k1").await.unwrap();
        store.save("osaka", "k2").await.unwrap();
        store.clear("kyoto").await.unwrap();

        assert!(store.load("kyoto").await.unwrap().is_none());
        assert_eq!(store.load("osaka").await.unwrap().as_deref(), Some("k2"));
    }

    #[tokio::test]
    async fn test_clear_without_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.toml");
        let store = FileCredentialStore::new(path.clone());

        store.clear("kyoto").await.unwrap();
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.toml");
        let store = FileCredentialStore::new(path.clone());
        store.save("kyoto", "k1").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_save_over_world_readable_file_tightens_it() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.toml");
        std::fs::write(&path, "[keys]\nosaka = \"k2\"\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileCredentialStore::new(path.clone());
        store.save("kyoto", "k1").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load("osaka").await.unwrap().as_deref(), Some("k2"));
    }
}
