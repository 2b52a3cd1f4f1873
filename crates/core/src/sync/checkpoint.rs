//! Per-account sync checkpoint contract and an in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{Error, Result};

/// Key-value store for the last synchronized transaction id of an account.
///
/// Implementations overwrite on `set`; they do not enforce monotonicity.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get(&self, namespace: &str, account_number: &str) -> Result<Option<i64>>;

    async fn set(&self, namespace: &str, account_number: &str, transaction_id: i64)
        -> Result<()>;
}

/// Process-local checkpoint store. Checkpoints are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    entries: Mutex<HashMap<(String, String), i64>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn get(&self, namespace: &str, account_number: &str) -> Result<Option<i64>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("checkpoint store lock poisoned".to_string()))?;
        Ok(entries
            .get(&(namespace.to_string(), account_number.to_string()))
            .copied())
    }

    async fn set(
        &self,
        namespace: &str,
        account_number: &str,
        transaction_id: i64,
    ) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("checkpoint store lock poisoned".to_string()))?;
        entries.insert(
            (namespace.to_string(), account_number.to_string()),
            transaction_id,
        );
        Ok(())
    }
}
