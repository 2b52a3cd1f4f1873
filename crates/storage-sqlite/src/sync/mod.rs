//! SQLite storage for sync state.

pub mod checkpoint;

pub use checkpoint::{SqliteCheckpointStore, SyncCheckpointDB};
