//! Error types for the core ledger client.

use thiserror::Error;

/// Result type alias for ledger client operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while talking to the core ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The ledger answered 404 for the resource.
    #[error("{0} not found")]
    NotFound(String),

    /// Any other non-success response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl LedgerError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status if the ledger answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<LedgerError> for fiosync_core::Error {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(resource) => fiosync_core::Error::not_found(resource),
            LedgerError::Api { status, message } => fiosync_core::Error::api(status, message),
            LedgerError::Http(source) => {
                fiosync_core::Error::transport("Request to core ledger failed", source.to_string())
            }
            LedgerError::Json(source) => {
                fiosync_core::Error::transport("Invalid core ledger payload", source.to_string())
            }
        }
    }
}
