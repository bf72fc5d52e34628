//! AppsScriptClient - HTTP implementation of the sheet API.
//!
//! Speaks the spreadsheet web-app protocol: `GET` for the full dataset and a
//! JSON envelope `POST` for every write. The client holds no state between
//! calls apart from the connection pool.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use travelsheet_core::TravelError;
use travelsheet_core::api::{ApiResponse, SheetApi, WriteRequest};
use travelsheet_core::credential::is_privileged;
use travelsheet_core::error::Result;
use travelsheet_core::model::RawDataset;

/// Content type used for write bodies.
///
/// The web app reads the raw body, and `text/plain` keeps the request simple
/// for the deployment's redirect handling.
const POST_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

#[derive(Clone)]
pub struct AppsScriptClient {
    client: Client,
    url: String,
}

impl AppsScriptClient {
    /// Creates a client for the web app at `url`.
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

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TravelError::transport(format!("Failed to read {what} response: {e}")))?;

        if !status.is_success() {
            return Err(TravelError::transport(format!(
                "{what} request returned HTTP {status}"
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("[AppsScriptClient] Non-JSON {} response: {}", what, e);
            TravelError::transport(format!("{what} response is not JSON: {e}"))
        })
    }
}

fn request_error(err: reqwest::Error) -> TravelError {
    if err.is_timeout() {
        TravelError::transport(format!("request timed out: {err}"))
    } else {
        TravelError::transport(format!("request failed: {err}"))
    }
}

#[async_trait]
impl SheetApi for AppsScriptClient {
    async fn fetch_all(&self, credential: Option<&str>) -> Result<RawDataset> {
        let mut request = self.client.get(&self.url);
        if let Some(key) = credential.filter(|k| is_privileged(Some(*k))) {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await.map_err(request_error)?;
        let dataset: RawDataset = Self::read_json(response, "fetch").await?;
        tracing::info!(
            "[AppsScriptClient] Fetched {} itinerary, {} expense, {} wish records",
            dataset.itinerary.len(),
            dataset.expenses.len(),
            dataset.wishes.len()
        );
        Ok(dataset)
    }

    async fn post(&self, request: &WriteRequest) -> Result<ApiResponse> {
        let body = serde_json::to_string(request)?;
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, POST_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(request_error)?;

        let parsed: ApiResponse = Self::read_json(response, "write").await?;
        match parsed.into_result() {
            Ok(accepted) => {
                tracing::debug!("[AppsScriptClient] {:?} accepted", request.action);
                Ok(accepted)
            }
            Err(e) => {
                tracing::warn!("[AppsScriptClient] {:?} rejected: {}", request.action, e);
                Err(e)
            }
        }
    }
}
