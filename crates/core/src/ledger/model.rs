//! Account, transaction and transfer shapes accepted by the core ledger.

use serde::{Deserialize, Serialize};

/// One ledger posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreTransfer {
    pub id: String,
    /// ISO-8601 UTC instant with millisecond precision.
    pub value_date: String,
    pub credit: String,
    pub debit: String,
    /// Absolute amount rendered as a decimal string.
    pub amount: String,
    pub currency: String,
}

/// A named group of transfers sharing one transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreTransaction {
    pub id: String,
    pub blame: String,
    pub transfers: Vec<CoreTransfer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreAccountStatement {
    pub account_number: String,
    pub transactions: Vec<CoreTransaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreAccount {
    pub account_number: String,
    pub currency: String,
    pub is_balance_check: bool,
}

impl CoreAccount {
    /// Account as created by the sync: never balance-checked.
    pub fn unchecked(account_number: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            currency: currency.into(),
            is_balance_check: false,
        }
    }
}
