//! Wire envelope and the remote sheet API trait.
//!
//! Defines the request/response shapes spoken with the spreadsheet backend and
//! the interface the coordinator uses to reach it.

use crate::error::{Result, TravelError};
use crate::model::{RawDataset, Record, Settings};
pub use crate::model::SheetKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Write operations the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    AddData,
    UpdateData,
    DeleteData,
    UpdateSettings,
    UploadImage,
}

/// The JSON body of every `POST`.
///
/// Absent fields are omitted rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<SheetKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl WriteRequest {
    fn bare(action: Action, key: Option<&str>) -> Self {
        Self {
            action,
            data: None,
            id: None,
            sheet: None,
            key: key.map(str::to_string),
            base64: None,
            file_name: None,
            file_type: None,
        }
    }

    /// `addData` when the record has no id yet, `updateData` otherwise.
    pub fn upsert(record: &Record, key: Option<&str>) -> Self {
        let action = if record.id().is_some() {
            Action::UpdateData
        } else {
            Action::AddData
        };
        Self {
            data: Some(record.to_wire()),
            id: record.id().map(str::to_string),
            sheet: Some(record.sheet()),
            ..Self::bare(action, key)
        }
    }

    pub fn delete(sheet: SheetKind, id: &str, key: Option<&str>) -> Self {
        Self {
            id: Some(id.to_string()),
            sheet: Some(sheet),
            ..Self::bare(Action::DeleteData, key)
        }
    }

    pub fn update_settings(settings: &Settings, key: Option<&str>) -> Self {
        Self {
            data: Some(settings.to_wire()),
            ..Self::bare(Action::UpdateSettings, key)
        }
    }

    /// Image upload; `base64` is the encoded file body without a data-URL prefix.
    pub fn upload_image(
        base64: String,
        file_name: &str,
        file_type: &str,
        key: Option<&str>,
    ) -> Self {
        Self {
            base64: Some(base64),
            file_name: Some(file_name.to_string()),
            file_type: Some(file_type.to_string()),
            ..Self::bare(Action::UploadImage, key)
        }
    }
}

/// The backend's answer to a write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ApiResponse {
    /// Turns `success: false` into the matching error kind.
    pub fn into_result(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(TravelError::from_rejection(self.message.as_deref()))
        }
    }
}

/// The remote spreadsheet backend.
///
/// Implementations are stateless: every call is a self-contained
/// request/response and nothing is cached between calls.
#[async_trait]
pub trait SheetApi: Send + Sync {
    /// Fetches the full dataset.
    ///
    /// A privileged credential, when given, widens what the backend returns.
    ///
    /// # Returns
    ///
    /// - `Ok(RawDataset)`: the backend's payload, unnormalized
    /// - `Err(TravelError::Transport)`: unreachable, timed out, or non-JSON
    async fn fetch_all(&self, credential: Option<&str>) -> Result<RawDataset>;

    /// Sends one write envelope.
    ///
    /// # Returns
    ///
    /// - `Ok(ApiResponse)`: the backend accepted the write
    /// - `Err(TravelError::Authorization | Application)`: `success: false`
    /// - `Err(TravelError::Transport)`: the request did not complete
    async fn post(&self, request: &WriteRequest) -> Result<ApiResponse>;
}
