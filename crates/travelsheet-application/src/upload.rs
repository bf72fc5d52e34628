//! Image uploads.
//!
//! Files go up one at a time so progress can be reported as `current/total`.
//! The backend stores each image and answers with its public URL.

use crate::notice::NoticeSender;
use crate::session::SessionContext;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use travelsheet_core::TravelError;
use travelsheet_core::api::{SheetApi, WriteRequest};
use travelsheet_core::error::Result;
use travelsheet_core::normalize::canonicalize_image_url;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress {
    /// Files attempted so far.
    pub current: usize,
    pub total: usize,
}

/// Outcome of a multi-file upload.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Canonical URLs of the stored images, in input order.
    pub urls: Vec<String>,
    pub failures: Vec<(PathBuf, TravelError)>,
    /// Files never attempted because the credential was rejected.
    pub skipped: usize,
}

pub struct ImageUploader {
    api: Arc<dyn SheetApi>,
    session: Arc<SessionContext>,
    notices: NoticeSender,
    progress: watch::Sender<UploadProgress>,
}

impl ImageUploader {
    pub fn new(api: Arc<dyn SheetApi>, session: Arc<SessionContext>, notices: NoticeSender) -> Self {
        let (progress, _) = watch::channel(UploadProgress::default());
        Self {
            api,
            session,
            notices,
            progress,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadProgress> {
        self.progress.subscribe()
    }

    /// Uploads `paths` sequentially.
    ///
    /// A failed file is reported and the rest still go up, except after an
    /// authorization failure: the session is demoted and the remaining files
    /// are skipped.
    pub async fn upload_files(&self, paths: &[PathBuf]) -> UploadReport {
        let mut report = UploadReport::default();
        self.progress.send_replace(UploadProgress {
            current: 0,
            total: paths.len(),
        });

        for (index, path) in paths.iter().enumerate() {
            let key = self.session.key().await;
            let result = self.upload_one(path, key.as_deref()).await;
            self.progress.send_modify(|p| p.current = index + 1);

            match result {
                Ok(url) => {
                    tracing::info!("[Upload] {} -> {}", path.display(), url);
                    report.urls.push(url);
                }
                Err(e) => {
                    tracing::warn!("[Upload] {} failed: {}", path.display(), e);
                    self.notices.report_failure(&self.session, &e).await;
                    let stop = e.is_authorization();
                    report.failures.push((path.clone(), e));
                    if stop {
                        report.skipped = paths.len() - index - 1;
                        break;
                    }
                }
            }
        }

        if !report.urls.is_empty() {
            self.notices
                .success(format!("Uploaded {} image(s)", report.urls.len()));
        }
        report
    }

    async fn upload_one(&self, path: &Path, key: Option<&str>) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let original = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let file_name = format!("{}_{}", Utc::now().timestamp_millis(), original);
        let file_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        let request = WriteRequest::upload_image(STANDARD.encode(bytes), &file_name, &file_type, key);
        let response = self.api.post(&request).await?;
        response
            .url
            .filter(|u| !u.trim().is_empty())
            .map(|u| canonicalize_image_url(&u))
            .ok_or_else(|| TravelError::Application("upload returned no url".to_string()))
    }
}
