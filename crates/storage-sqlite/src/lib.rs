//! SQLite persistence for the FIO sync.

pub mod db;
pub mod errors;
pub mod schema;
pub mod sync;

pub use db::{create_pool, init, run_migrations, DbPool};
pub use errors::StorageError;
pub use sync::SqliteCheckpointStore;
