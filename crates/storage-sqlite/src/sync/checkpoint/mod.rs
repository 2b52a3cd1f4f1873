//! Per-account checkpoints of the bank statement sync.

mod model;
mod repository;

pub use model::SyncCheckpointDB;
pub use repository::SqliteCheckpointStore;
