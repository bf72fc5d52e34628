use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use travelsheet_application::{ImageUploader, MutationCoordinator, Notice, NoticeLevel, SessionContext};
use travelsheet_core::api::SheetApi;
use travelsheet_core::cache::SnapshotCache;
use travelsheet_core::config::AppConfig;
use travelsheet_core::credential::CredentialStore;
use travelsheet_infrastructure::{ConfigService, FileCredentialStore, FileSnapshotCache, TravelPaths};
use travelsheet_interaction::{AppsScriptClient, CatalogClient};

pub struct App {
    pub coordinator: MutationCoordinator,
    pub uploader: ImageUploader,
    notices: UnboundedReceiver<Notice>,
}

impl App {
    /// Prints every notice queued so far.
    pub fn print_notices(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            match notice.level {
                NoticeLevel::Success => println!("✅ {}", notice.message),
                NoticeLevel::Error => eprintln!("❌ {}", notice.message),
            }
        }
    }

    /// Persists pending wish edits before the process exits.
    pub async fn finish(&mut self) {
        if self.coordinator.has_pending_sync().await {
            self.coordinator.flush_now().await;
        }
        self.coordinator.shutdown().await;
        self.print_notices();
    }
}

/// Wires config, backend, cache and session together and loads the trip.
pub async fn boot(trip: Option<String>, key: Option<String>) -> Result<App> {
    let config = ConfigService::default_location()?.get_config()?;
    let trip_id = trip
        .or_else(|| config.trip_id.clone())
        .filter(|t| !t.trim().is_empty())
        .context("No trip selected. Pass --trip or set trip_id in config.toml")?;

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let api_url = resolve_api_url(&config, &trip_id, timeout).await?;
    tracing::debug!("[Boot] Trip '{}' served by {}", trip_id, api_url);

    let api: Arc<dyn SheetApi> = Arc::new(AppsScriptClient::new(api_url, timeout)?);
    let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::default_location()?);
    let cache_dir = match &config.cache_dir {
        Some(dir) => dir.clone(),
        None => TravelPaths::cache_dir()?,
    };
    let cache: Arc<dyn SnapshotCache> = Arc::new(FileSnapshotCache::new(cache_dir));

    let session = Arc::new(SessionContext::launch(trip_id, key.as_deref(), store).await?);
    let (coordinator, notices) = MutationCoordinator::new(
        api.clone(),
        Some(cache),
        session.clone(),
        Duration::from_millis(config.debounce_ms),
    );
    let uploader = ImageUploader::new(api, session, coordinator.notices());

    let mut app = App {
        coordinator,
        uploader,
        notices,
    };
    if let Err(e) = app.coordinator.init().await {
        // Cached data, if any, is still shown.
        tracing::warn!("[Boot] Initial fetch failed: {}", e);
    }
    app.print_notices();
    Ok(app)
}

async fn resolve_api_url(config: &AppConfig, trip_id: &str, timeout: Duration) -> Result<String> {
    if !config.api_url.trim().is_empty() {
        return Ok(config.api_url.clone());
    }
    anyhow::ensure!(
        !config.catalog_url.trim().is_empty(),
        "Neither api_url nor catalog_url is configured"
    );

    let boot = CatalogClient::new(config.catalog_url.clone(), timeout)?
        .fetch_boot_config(trip_id)
        .await
        .with_context(|| format!("Failed to look up trip '{}'", trip_id))?;
    if let Some(name) = &boot.display_name {
        tracing::info!("[Boot] {} (theme: {})", name, boot.theme());
    }
    Ok(boot.gas_url)
}
