//! Synchronization of FIO bank statements into the core ledger.
//!
//! The crate holds the pure statement conversion, the batched account and
//! transaction sync with its checkpointing, and the contracts of the
//! collaborators (bank feed, ledger, checkpoint store) that the other
//! workspace crates implement.

pub mod config;
pub mod errors;
pub mod fio;
pub mod ledger;
pub mod sync;

pub use config::{SyncConfig, SyncJob};
pub use errors::{Error, Result};
