//! Error types for the FIO bank feed client.

use thiserror::Error;

use fiosync_core::sync::FIO_MANDATORY_WAIT_SECS;

/// Result type alias for bank feed operations.
pub type Result<T> = std::result::Result<T, FioError>;

#[derive(Debug, Error)]
pub enum FioError {
    /// Transport failure talking to the FIO API. The request URL is stripped
    /// because its path carries the account token.
    #[error("Request to FIO api failed: {0}")]
    Http(reqwest::Error),

    /// The statement payload could not be decoded.
    #[error("Unreadable FIO account statement: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response other than the polling limit.
    #[error("Request to FIO api failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// The token was polled again before the mandatory wait elapsed.
    #[error(
        "FIO transaction api unavailable, you have to wait {} seconds between calls",
        FIO_MANDATORY_WAIT_SECS
    )]
    TooEarly,
}

impl From<reqwest::Error> for FioError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

impl FioError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::TooEarly => Some(crate::client::TOO_EARLY_STATUS),
            Self::Json(_) => None,
        }
    }
}

impl From<FioError> for fiosync_core::Error {
    fn from(err: FioError) -> Self {
        let message = err.to_string();
        match err {
            FioError::TooEarly => fiosync_core::Error::RateLimited(message),
            FioError::Api { status, .. } => fiosync_core::Error::api(status, message),
            FioError::Http(source) => {
                fiosync_core::Error::transport("Request to FIO api failed", source.to_string())
            }
            FioError::Json(_) => fiosync_core::Error::invalid_statement(message),
        }
    }
}
