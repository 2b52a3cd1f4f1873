//! Tenant-scoped writes into the core ledger: account reconciliation and
//! batched transaction submission with checkpointing.

use std::sync::Arc;

use log::info;

use super::batch::{ignore_batch, run_batched};
use super::checkpoint::CheckpointStore;
use crate::config::SyncConfig;
use crate::errors::Result;
use crate::ledger::{CoreAccount, CoreTransaction, LedgerApi};

pub struct Tenant {
    name: String,
    checkpoint_namespace: String,
    accounts_batch_size: usize,
    transactions_batch_size: usize,
    ledger: Arc<dyn LedgerApi>,
    checkpoints: Arc<dyn CheckpointStore>,
}

impl Tenant {
    pub fn new(
        config: &SyncConfig,
        ledger: Arc<dyn LedgerApi>,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            name: config.tenant.clone(),
            checkpoint_namespace: config.checkpoint_namespace.clone(),
            accounts_batch_size: config.accounts_batch_size,
            transactions_batch_size: config.transactions_batch_size,
            ledger,
            checkpoints,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ensures every account exists in the ledger, creating the missing ones.
    ///
    /// Any failure other than not-found aborts the run after the current
    /// batch settles.
    pub async fn create_missing_accounts(&self, accounts: Vec<CoreAccount>) -> Result<()> {
        run_batched(
            accounts,
            self.accounts_batch_size,
            move |account, _index| self.ensure_account(account),
            ignore_batch,
        )
        .await
    }

    async fn ensure_account(&self, account: CoreAccount) -> Result<()> {
        match self.ledger.get_account(&account.account_number).await {
            Ok(()) => {
                info!("Account {} already exists", account.account_number);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                self.ledger.create_account(&account).await?;
                info!("Created account {}", account.account_number);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Submits transactions in parallel batches, storing a checkpoint for
    /// `account_number` after each successful batch.
    ///
    /// The stored value is the highest position of a transaction within its
    /// batch, not a ledger id, and each batch overwrites the previous value.
    pub async fn create_transactions(
        &self,
        transactions: Vec<CoreTransaction>,
        account_number: &str,
    ) -> Result<()> {
        run_batched(
            transactions,
            self.transactions_batch_size,
            move |transaction, index| self.submit_transaction(transaction, index),
            move |transaction_ids: Vec<i64>| {
                self.store_batch_checkpoint(account_number, transaction_ids)
            },
        )
        .await
    }

    async fn submit_transaction(&self, transaction: CoreTransaction, index: usize) -> Result<i64> {
        self.ledger.create_transaction(&transaction).await?;
        // TODO: checkpoint the ledger-assigned transaction id once the ledger returns one.
        let transaction_id = index as i64;
        info!("Created transaction ID {}", transaction_id);
        Ok(transaction_id)
    }

    async fn store_batch_checkpoint(
        &self,
        account_number: &str,
        transaction_ids: Vec<i64>,
    ) -> Result<()> {
        let Some(max) = transaction_ids.into_iter().max() else {
            return Ok(());
        };
        self.checkpoints
            .set(&self.checkpoint_namespace, account_number, max)
            .await?;
        info!("Max ID {}", max);
        Ok(())
    }

    pub async fn get_transaction_checkpoint(&self, account_number: &str) -> Result<Option<i64>> {
        self.checkpoints
            .get(&self.checkpoint_namespace, account_number)
            .await
    }
}
