//! Core ledger domain: model and client contract.

mod model;

use async_trait::async_trait;

use crate::errors::Result;

pub use model::{CoreAccount, CoreAccountStatement, CoreTransaction, CoreTransfer};

/// Operations the sync needs from the core ledger of one tenant.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Probes an account. Returns [`crate::Error::NotFound`] when the ledger
    /// does not know it.
    async fn get_account(&self, account_number: &str) -> Result<()>;

    async fn create_account(&self, account: &CoreAccount) -> Result<()>;

    async fn create_transaction(&self, transaction: &CoreTransaction) -> Result<()>;
}
