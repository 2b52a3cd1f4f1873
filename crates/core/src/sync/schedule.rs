//! Timing constants of the FIO feed and the sync loop.

/// FIO allows one statement download per token every 20 seconds.
pub const FIO_MANDATORY_WAIT_SECS: u64 = 20;

/// Default pause between sync cycles, just above the FIO polling limit.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 22;

/// Cursor date used when an account has no checkpoint yet.
pub const FIO_EPOCH_DATE: &str = "1900-01-01";
