//! Storage errors and their mapping into the sync error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Database connection failed: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Database migration failed: {0}")]
    Migration(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

impl From<StorageError> for fiosync_core::Error {
    fn from(err: StorageError) -> Self {
        fiosync_core::Error::Storage(err.to_string())
    }
}
