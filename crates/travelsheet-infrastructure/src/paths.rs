//! Path management for travelsheet files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/travelsheet/       # Config directory
//! ├── config.toml              # Application configuration
//! └── credentials.toml         # Per-trip access keys (0600)
//!
//! ~/.cache/travelsheet/        # Cache directory
//! └── cache_<trip>.json        # Last successful fetch per trip
//! ```

use std::path::{Path, PathBuf};
use travelsheet_core::TravelError;
use travelsheet_core::error::Result;

const APP_DIR: &str = "travelsheet";

pub struct TravelPaths;

impl TravelPaths {
    /// Returns the travelsheet configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| TravelError::config("Cannot find config directory"))
    }

    /// Returns the travelsheet cache directory.
    ///
    /// Falls back to the config directory on platforms without a cache dir.
    pub fn cache_dir() -> Result<PathBuf> {
        match dirs::cache_dir() {
            Some(dir) => Ok(dir.join(APP_DIR)),
            None => Self::config_dir(),
        }
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// # Security Note
    ///
    /// The store created at this path restricts it to owner read/write.
    pub fn credentials_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("credentials.toml"))
    }

    /// Cache file for `trip_id` inside `dir`.
    ///
    /// Characters outside `[A-Za-z0-9_-]` are replaced so a trip id can never
    /// escape the cache directory.
    pub fn cache_file(dir: &Path, trip_id: &str) -> PathBuf {
        let safe: String = trip_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        dir.join(format!("cache_{}.json", safe))
    }
}
