//! Catalog client: resolves a trip id to the web app that serves it.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use travelsheet_core::TravelError;
use travelsheet_core::error::Result;

pub const DEFAULT_THEME: &str = "spring";

/// Per-trip boot configuration returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootConfig {
    /// Data endpoint for this trip.
    pub gas_url: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub theme_id: Option<String>,
}

impl BootConfig {
    pub fn theme(&self) -> &str {
        self.theme_id
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_THEME)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    gas_url: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    theme_id: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    url: String,
}

impl CatalogClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TravelError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Looks up `trip_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(BootConfig)`: the trip exists
    /// - `Err(TravelError::NotFound)`: the catalog reported an error for it
    /// - `Err(TravelError::Transport)`: the catalog was unreachable or not JSON
    pub async fn fetch_boot_config(&self, trip_id: &str) -> Result<BootConfig> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("trip", trip_id)])
            .send()
            .await
            .map_err(|e| TravelError::transport(format!("catalog request failed: {e}")))?;

        let text = response
            .text()
            .await
            .map_err(|e| TravelError::transport(format!("catalog response unreadable: {e}")))?;
        let parsed: CatalogResponse = serde_json::from_str(&text)
            .map_err(|e| TravelError::transport(format!("catalog response is not JSON: {e}")))?;

        if parsed.error.as_ref().is_some_and(|e| !e.is_null()) {
            tracing::warn!("[CatalogClient] Trip '{}' not found", trip_id);
            return Err(TravelError::not_found("trip", trip_id));
        }

        let gas_url = parsed
            .gas_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                TravelError::config(format!("catalog entry for '{}' has no data URL", trip_id))
            })?;

        tracing::info!("[CatalogClient] Resolved trip '{}'", trip_id);
        Ok(BootConfig {
            gas_url,
            display_name: parsed.display_name,
            theme_id: parsed.theme_id,
        })
    }
}
