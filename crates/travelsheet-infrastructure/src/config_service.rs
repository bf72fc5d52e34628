//! Configuration service implementation.
//!
//! Loads `AppConfig` from `~/.config/travelsheet/config.toml`, writing the
//! defaults there on first run, then applies environment overrides.

use crate::paths::TravelPaths;
use crate::storage::AtomicFile;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use travelsheet_core::config::AppConfig;
use travelsheet_core::error::Result;

pub const ENV_API_URL: &str = "TRAVELSHEET_API_URL";
pub const ENV_CATALOG_URL: &str = "TRAVELSHEET_CATALOG_URL";
pub const ENV_TRIP: &str = "TRAVELSHEET_TRIP";

/// Loads and caches the application configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn default_location() -> Result<Self> {
        Ok(Self::new(TravelPaths::config_file()?))
    }

    /// Returns the configuration, reading the file on first access.
    pub fn get_config(&self) -> Result<AppConfig> {
        if let Ok(guard) = self.config.read() {
            if let Some(cached) = guard.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_with(|name| std::env::var(name).ok())?;
        if let Ok(mut guard) = self.config.write() {
            *guard = Some(loaded.clone());
        }
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut guard) = self.config.write() {
            *guard = None;
        }
    }

    /// Reads the file (creating it when missing) and applies overrides looked
    /// up through `env`.
    pub fn load_with<F>(&self, env: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = AtomicFile::<AppConfig>::toml(self.path.clone());
        let config = match file.load()? {
            Some(config) => config,
            None => {
                let config = AppConfig::default();
                if let Err(e) = file.save(&config) {
                    tracing::warn!(
                        "[ConfigService] Could not write default config to {}: {}",
                        self.path.display(),
                        e
                    );
                } else {
                    tracing::info!(
                        "[ConfigService] Created default config at {}",
                        self.path.display()
                    );
                }
                config
            }
        };
        Ok(apply_env_overrides(config, env))
    }
}

/// Non-blank environment values replace the file's values.
pub fn apply_env_overrides<F>(mut config: AppConfig, env: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    if let Some(url) = lookup(ENV_API_URL) {
        config.api_url = url;
    }
    if let Some(url) = lookup(ENV_CATALOG_URL) {
        config.catalog_url = url;
    }
    if let Some(trip) = lookup(ENV_TRIP) {
        config.trip_id = Some(trip);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(path.clone());

        let config = service.load_with(no_env).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_file_values_are_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "catalog_url = \"https://catalog\"\ndebounce_ms = 500\n").unwrap();

        let config = ConfigService::new(path).load_with(no_env).unwrap();
        assert_eq!(config.catalog_url, "https://catalog");
        assert_eq!(config.debounce_ms, 500);
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_URL, "https://api"),
            (ENV_TRIP, "kyoto"),
            (ENV_CATALOG_URL, "  "),
        ]);
        let base = AppConfig {
            catalog_url: "https://catalog".into(),
            ..Default::default()
        };
        let config = apply_env_overrides(base, |name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_url, "https://api");
        assert_eq!(config.trip_id.as_deref(), Some("kyoto"));
        assert_eq!(config.catalog_url, "https://catalog");
    }

    #[test]
    fn test_get_config_is_cached() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "debounce_ms = 700\n").unwrap();
        let service = ConfigService::new(path.clone());

        let first = service.get_config().unwrap();
        std::fs::write(&path, "debounce_ms = 900\n").unwrap();
        assert_eq!(service.get_config().unwrap().debounce_ms, first.debounce_ms);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().debounce_ms, 900);
    }
}
