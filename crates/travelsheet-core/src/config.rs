use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_DEBOUNCE_MS: u64 = 1500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application settings read from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Data endpoint; when empty it is taken from the catalog boot config.
    #[serde(default)]
    pub api_url: String,
    /// Catalog endpoint that maps a trip id to its data endpoint.
    #[serde(default)]
    pub catalog_url: String,
    /// Trip opened when none is given on the command line.
    #[serde(default)]
    pub trip_id: Option<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Overrides the platform cache directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            catalog_url: String::new(),
            trip_id: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_dir: None,
        }
    }
}
