//! Transient user-facing notices.
//!
//! Remote failures never propagate into view computation; they are turned
//! into notices and pushed onto an unbounded channel that the presentation
//! layer drains.

use crate::session::SessionContext;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use travelsheet_core::TravelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// The notice shown for a failed remote call.
    pub fn for_error(err: &TravelError) -> Self {
        match err {
            TravelError::Authorization(_) => {
                Self::error("Verification failed, admin features disabled")
            }
            TravelError::Application(message) => Self::error(format!("Operation failed: {}", message)),
            TravelError::Unauthorized(_) => Self::error("Permission insufficient"),
            TravelError::Transport(_) => Self::error("Network error, please try again"),
            other => Self::error(other.to_string()),
        }
    }
}

/// Sending half of the notice channel. Sends never fail: a dropped receiver
/// just means nobody is listening.
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: UnboundedSender<Notice>,
}

impl NoticeSender {
    pub fn channel() -> (Self, UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("[Notice] receiver dropped, notice discarded");
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(Notice::success(message));
    }

    /// Reports a failed remote call.
    ///
    /// Authorization failures also demote the session so later calls go out
    /// without the rejected credential.
    pub async fn report_failure(&self, session: &SessionContext, err: &TravelError) {
        if err.is_authorization() {
            session.demote().await;
        }
        self.send(Notice::for_error(err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use travelsheet_core::credential::Credential;

    #[test]
    fn test_notice_messages() {
        assert_eq!(
            Notice::for_error(&TravelError::Application("sheet busy".into())).message,
            "Operation failed: sheet busy"
        );
        assert_eq!(
            Notice::for_error(&TravelError::Authorization("金鑰錯誤".into())).message,
            "Verification failed, admin features disabled"
        );
        assert_eq!(
            Notice::for_error(&TravelError::transport("down")).level,
            NoticeLevel::Error
        );
    }

    #[tokio::test]
    async fn test_authorization_failure_demotes_session() {
        let session = SessionContext::new("kyoto", Credential::new("k"), None);
        let (sender, mut rx) = NoticeSender::channel();

        sender
            .report_failure(&session, &TravelError::Authorization("權限不足".into()))
            .await;

        assert!(!session.is_privileged().await);
        assert_eq!(rx.recv().await.unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_other_failures_keep_credential() {
        let session = SessionContext::new("kyoto", Credential::new("k"), None);
        let (sender, _rx) = NoticeSender::channel();

        sender
            .report_failure(&session, &TravelError::transport("down"))
            .await;

        assert!(session.is_privileged().await);
    }
}
