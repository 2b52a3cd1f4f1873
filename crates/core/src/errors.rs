//! Error types shared by the sync pipeline and its collaborators.

use thiserror::Error;

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can surface anywhere in a sync cycle.
///
/// Client adapters translate their transport-level failures into these
/// variants, so pipeline code can dispatch on the variant instead of probing
/// HTTP status codes.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested resource does not exist (ledger 404).
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The bank feed refused the request because it came too early.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Network failure or an unreadable response.
    #[error("{context}: {message}")]
    Transport { context: String, message: String },

    /// Non-success HTTP response that is neither not-found nor rate limiting.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Checkpoint persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The bank statement could not be converted.
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn transport(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_statement(message: impl Into<String>) -> Self {
        Self::InvalidStatement(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}
