//! Checkpointed, batched synchronization of bank statements into the ledger.

mod batch;
mod checkpoint;
mod metrics;
mod schedule;
mod service;
mod tenant;

pub use batch::{ignore_batch, run_batched};
pub use checkpoint::{CheckpointStore, MemoryCheckpointStore};
pub use metrics::SyncMetrics;
pub use schedule::*;
pub use service::{SyncReport, SyncRunSummary, SyncService};
pub use tenant::Tenant;
