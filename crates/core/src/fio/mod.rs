//! FIO bank feed domain: raw statement model, conversion and client contract.

mod model;
mod statement;

use async_trait::async_trait;

use crate::errors::Result;

pub use model::{
    AccountStatement, FioAccountStatement, FioTransfer, FioValue, StatementInfo, TransactionList,
};
pub use statement::{
    extract_unique_core_accounts, parse_value_date, to_core_account_statement, BLAME,
    UNKNOWN_COUNTERPARTY,
};

/// Source of raw account statements.
#[async_trait]
pub trait BankFeed: Send + Sync {
    /// Moves the feed cursor past `from_transaction_id` (or to the beginning
    /// of time when absent) and downloads everything after it.
    ///
    /// With `allow_retry` a rate-limited download is retried once after the
    /// mandatory wait.
    async fn get_account_statement(
        &self,
        token: &str,
        from_transaction_id: Option<i64>,
        allow_retry: bool,
    ) -> Result<FioAccountStatement>;
}
