//! Error types for travelsheet.

use thiserror::Error;

/// Message fragments the backend uses when it rejects a credential.
///
/// The backend does not return a structured code for authorization problems,
/// so they are recognised by substring.
pub const AUTHORIZATION_MARKERS: &[&str] = &["金鑰", "權限", "permission", "invalid key"];

/// A shared error type for every travelsheet crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TravelError {
    /// Network unreachable, timeout, or a response that is not JSON.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend rejected the held credential.
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// The backend answered `success: false` for another reason.
    #[error("Operation failed: {0}")]
    Application(String),

    /// The session holds no usable credential for a privileged operation.
    #[error("Permission denied: {0}")]
    Unauthorized(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TravelError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classifies a `success: false` message from the backend.
    ///
    /// Messages mentioning the credential become `Authorization`, everything
    /// else becomes `Application` carrying the server text verbatim.
    pub fn from_rejection(message: Option<&str>) -> Self {
        let message = message.unwrap_or_default();
        let lower = message.to_lowercase();
        if AUTHORIZATION_MARKERS
            .iter()
            .any(|marker| lower.contains(marker))
        {
            Self::Authorization(message.to_string())
        } else if message.is_empty() {
            Self::Application("unknown error".to_string())
        } else {
            Self::Application(message.to_string())
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an authorization failure reported by the backend
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    /// Check if this is a transport failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TravelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TravelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TravelError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TravelError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TravelError>`.
pub type Result<T> = std::result::Result<T, TravelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_with_permission_marker_is_authorization() {
        let err = TravelError::from_rejection(Some("權限不足，請確認金鑰"));
        assert!(err.is_authorization());
    }

    #[test]
    fn test_rejection_ascii_marker_is_case_insensitive() {
        let err = TravelError::from_rejection(Some("Permission denied for sheet"));
        assert!(err.is_authorization());
    }

    #[test]
    fn test_rejection_keeps_server_message() {
        let err = TravelError::from_rejection(Some("Sheet not found"));
        assert_eq!(err, TravelError::Application("Sheet not found".to_string()));
    }

    #[test]
    fn test_rejection_without_message() {
        let err = TravelError::from_rejection(None);
        assert_eq!(err, TravelError::Application("unknown error".to_string()));
    }

    #[test]
    fn test_io_conversion() {
        let err: TravelError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, TravelError::Io { .. }));
    }
}
