//! Atomic file operations for TOML and JSON documents.
//!
//! Writes go to a sibling temp file that is fsynced and renamed over the
//! target, so readers see either the old or the new document. Read-modify-write
//! cycles additionally hold an exclusive `fs2` lock.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;
use travelsheet_core::TravelError;

/// On-disk encoding of an [`AtomicFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    fn name(&self) -> &'static str {
        match self {
            FileFormat::Toml => "TOML",
            FileFormat::Json => "JSON",
        }
    }
}

#[derive(Debug, Error)]
pub enum AtomicFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file exists but does not decode as the expected document.
    #[error("{format} parse error: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("{format} serialization error: {message}")]
    Serialize {
        format: &'static str,
        message: String,
    },

    #[error("Lock error: {0}")]
    Lock(String),
}

impl AtomicFileError {
    pub fn is_parse(&self) -> bool {
        matches!(self, AtomicFileError::Parse { .. })
    }
}

impl From<AtomicFileError> for TravelError {
    fn from(err: AtomicFileError) -> Self {
        match err {
            AtomicFileError::Io(e) => TravelError::io(e.to_string()),
            AtomicFileError::Parse { format, message }
            | AtomicFileError::Serialize { format, message } => TravelError::Serialization {
                format: format.to_string(),
                message,
            },
            AtomicFileError::Lock(message) => TravelError::io(message),
        }
    }
}

/// A handle to a document stored atomically on disk.
pub struct AtomicFile<T> {
    path: PathBuf,
    format: FileFormat,
    mode: Option<u32>,
    _phantom: PhantomData<T>,
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf, format: FileFormat) -> Self {
        Self {
            path,
            format,
            mode: None,
            _phantom: PhantomData,
        }
    }

    /// Unix permission bits the document is created with. Ignored elsewhere.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn toml(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Toml)
    }

    pub fn json(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and decodes the document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and decoded
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        self.decode(&content).map(Some)
    }

    /// Writes the document through a temp file and an atomic rename.
    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let encoded = self.encode(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = self.create_temp(&tmp_path)?;
        tmp_file.write_all(encoded.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Loads (or starts from `default_value`), applies `f`, and saves, all
    /// under an exclusive lock.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<(), AtomicFileError>
    where
        F: FnOnce(&mut T),
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        f(&mut data);
        self.save(&data)
    }

    /// Removes the document. Missing files are not an error.
    pub fn remove(&self) -> Result<(), AtomicFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Opens the temp file with the configured mode in place before any
    /// bytes are written. A stale temp file keeps its old bits on open, so
    /// those are reset on the handle.
    fn create_temp(&self, tmp_path: &Path) -> Result<File, AtomicFileError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            if let Some(mode) = self.mode {
                options.mode(mode);
                let file = options.open(tmp_path)?;
                file.set_permissions(fs::Permissions::from_mode(mode))?;
                return Ok(file);
            }
        }

        Ok(options.open(tmp_path)?)
    }

    fn decode(&self, content: &str) -> Result<T, AtomicFileError> {
        let parse_error = |message: String| AtomicFileError::Parse {
            format: self.format.name(),
            message,
        };
        match self.format {
            FileFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
            FileFormat::Json => {
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))
            }
        }
    }

    fn encode(&self, data: &T) -> Result<String, AtomicFileError> {
        let serialize_error = |message: String| AtomicFileError::Serialize {
            format: self.format.name(),
            message,
        };
        match self.format {
            FileFormat::Toml => {
                toml::to_string_pretty(data).map_err(|e| serialize_error(e.to_string()))
            }
            FileFormat::Json => {
                serde_json::to_string_pretty(data).map_err(|e| serialize_error(e.to_string()))
            }
        }
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicFileError> {
        let invalid = |msg: &str| {
            AtomicFileError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, msg))
        };
        let parent = self
            .path
            .parent()
            .ok_or_else(|| invalid("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| invalid("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// An exclusive lock on `<path>.lock`, released on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| AtomicFileError::Lock(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Keys {
        #[serde(default)]
        trips: BTreeMap<String, String>,
    }

    #[test]
    fn test_toml_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Keys>::toml(temp_dir.path().join("keys.toml"));

        let mut keys = Keys::default();
        keys.trips.insert("kyoto".into(), "k1".into());
        file.save(&keys).unwrap();

        assert_eq!(file.load().unwrap(), Some(keys));
    }

    #[test]
    fn test_json_save_creates_parent_and_leaves_no_temp() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("cache_kyoto.json");
        let file = AtomicFile::<serde_json::Value>::json(path.clone());

        file.save(&serde_json::json!({ "wishes": [] })).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("nested").join(".cache_kyoto.json.tmp").exists());
        assert_eq!(file.load().unwrap().unwrap()["wishes"], serde_json::json!([]));
    }

    #[cfg(unix)]
    #[test]
    fn test_mode_applies_before_rename_even_over_stale_temp() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.toml");
        let stale = temp_dir.path().join(".credentials.toml.tmp");
        fs::write(&stale, "leftover").unwrap();
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).unwrap();

        let file = AtomicFile::<Keys>::toml(path.clone()).with_mode(0o600);
        file.save(&Keys::default()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert!(!stale.exists());
    }

    #[test]
    fn test_missing_and_empty_files_load_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keys.toml");
        let file = AtomicFile::<Keys>::toml(path.clone());
        assert!(file.load().unwrap().is_none());

        fs::write(&path, "   \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let err = AtomicFile::<serde_json::Value>::json(path).load().unwrap_err();
        assert!(err.is_parse());
        assert!(TravelError::from(err).is_serialization());
    }

    #[test]
    fn test_update_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Keys>::toml(temp_dir.path().join("keys.toml"));

        file.update(Keys::default(), |keys| {
            keys.trips.insert("kyoto".into(), "k1".into());
        })
        .unwrap();
        file.update(Keys::default(), |keys| {
            keys.trips.insert("osaka".into(), "k2".into());
        })
        .unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.trips.len(), 2);
        assert!(!temp_dir.path().join("keys.lock").exists());

        file.remove().unwrap();
        file.remove().unwrap();
        assert!(file.load().unwrap().is_none());
    }
}
