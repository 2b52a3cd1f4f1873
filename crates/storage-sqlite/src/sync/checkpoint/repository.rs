//! Checkpoint repository backed by the `sync_checkpoints` table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use log::debug;

use fiosync_core::sync::CheckpointStore;

use super::model::SyncCheckpointDB;
use crate::db::{get_connection, DbPool};
use crate::errors::{Result, StorageError};
use crate::schema::sync_checkpoints;

#[derive(Clone)]
pub struct SqliteCheckpointStore {
    pool: Arc<DbPool>,
}

impl SqliteCheckpointStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    pub fn get_checkpoint(&self, namespace: &str, account_number: &str) -> Result<Option<i64>> {
        let mut conn = get_connection(&self.pool)?;
        let row = sync_checkpoints::table
            .find((namespace, account_number))
            .select(SyncCheckpointDB::as_select())
            .first::<SyncCheckpointDB>(&mut conn)
            .optional()?;
        Ok(row.map(|r| r.last_transaction_id))
    }

    /// Upserts the checkpoint, replacing any previous value.
    pub fn set_checkpoint(
        &self,
        namespace: &str,
        account_number: &str,
        transaction_id: i64,
    ) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = Utc::now().to_rfc3339();
        let row = SyncCheckpointDB {
            namespace: namespace.to_string(),
            account_number: account_number.to_string(),
            last_transaction_id: transaction_id,
            updated_at: now.clone(),
        };

        diesel::insert_into(sync_checkpoints::table)
            .values(&row)
            .on_conflict((sync_checkpoints::namespace, sync_checkpoints::account_number))
            .do_update()
            .set((
                sync_checkpoints::last_transaction_id.eq(transaction_id),
                sync_checkpoints::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

        debug!(
            "Stored checkpoint {} for {}/{}",
            transaction_id, namespace, account_number
        );
        Ok(())
    }

    pub fn list_checkpoints(&self, namespace: &str) -> Result<Vec<SyncCheckpointDB>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(sync_checkpoints::table
            .filter(sync_checkpoints::namespace.eq(namespace))
            .order(sync_checkpoints::account_number.asc())
            .select(SyncCheckpointDB::as_select())
            .load::<SyncCheckpointDB>(&mut conn)?)
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    async fn get(
        &self,
        namespace: &str,
        account_number: &str,
    ) -> fiosync_core::Result<Option<i64>> {
        let store = self.clone();
        let (namespace, account_number) = (namespace.to_string(), account_number.to_string());
        let checkpoint = tokio::task::spawn_blocking(move || {
            store.get_checkpoint(&namespace, &account_number)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))??;
        Ok(checkpoint)
    }

    async fn set(
        &self,
        namespace: &str,
        account_number: &str,
        transaction_id: i64,
    ) -> fiosync_core::Result<()> {
        let store = self.clone();
        let (namespace, account_number) = (namespace.to_string(), account_number.to_string());
        tokio::task::spawn_blocking(move || {
            store.set_checkpoint(&namespace, &account_number, transaction_id)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))??;
        Ok(())
    }
}
