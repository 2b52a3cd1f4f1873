//! Raw account statement as served by the FIO bank feed.
//!
//! The feed reports every transfer ("pohyb") as a bag of numbered columns,
//! each wrapped in a `{ "value", "name", "id" }` node. Only the columns the
//! sync needs are mapped; everything else is ignored on deserialization.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Top-level envelope of `GET /last/{token}/transactions.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FioAccountStatement {
    pub account_statement: AccountStatement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatement {
    pub info: StatementInfo,
    pub transaction_list: TransactionList,
}

/// Statement header. `iban` and `currency` drive the conversion, the rest is
/// informational.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementInfo {
    pub iban: String,
    pub currency: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub bank_id: Option<String>,
    #[serde(default)]
    pub bic: Option<String>,
    #[serde(default)]
    pub opening_balance: Option<Decimal>,
    #[serde(default)]
    pub closing_balance: Option<Decimal>,
    #[serde(default)]
    pub id_from: Option<i64>,
    #[serde(default)]
    pub id_to: Option<i64>,
    #[serde(default)]
    pub id_last_download: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionList {
    /// The feed sends `null` instead of an empty array when nothing moved.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub transaction: Vec<FioTransfer>,
}

/// One column node of a transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FioValue<T> {
    pub value: T,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

impl<T> FioValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            name: None,
            id: None,
        }
    }
}

/// A single transfer line of the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FioTransfer {
    /// `YYYY-MM-DD+HHMM`, a date with an UTC offset and no time of day.
    #[serde(rename = "column0")]
    pub value_date: FioValue<String>,
    /// Signed amount; positive values enter the main account.
    #[serde(rename = "column1")]
    pub amount: FioValue<Decimal>,
    #[serde(rename = "column2", default)]
    pub counterparty: Option<FioValue<String>>,
    /// Instruction ("pokyn") id shared by all transfers of one transaction.
    #[serde(rename = "column17")]
    pub transaction_id: FioValue<i64>,
    #[serde(rename = "column22")]
    pub transfer_id: FioValue<i64>,
}

impl StatementInfo {
    /// One-line description of the optional header fields, for logging.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        match (&self.account_id, &self.bank_id) {
            (Some(account), Some(bank)) => parts.push(format!("account {}/{}", account, bank)),
            (Some(account), None) => parts.push(format!("account {}", account)),
            _ => {}
        }
        if let Some(bic) = &self.bic {
            parts.push(format!("BIC {}", bic));
        }
        if let (Some(opening), Some(closing)) = (self.opening_balance, self.closing_balance) {
            parts.push(format!(
                "balance {} -> {} {}",
                opening.normalize(),
                closing.normalize(),
                self.currency
            ));
        }
        if let (Some(from), Some(to)) = (self.id_from, self.id_to) {
            parts.push(format!("movements {}..{}", from, to));
        }
        if let Some(last) = self.id_last_download {
            parts.push(format!("last download {}", last));
        }

        if parts.is_empty() {
            "no metadata".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl FioAccountStatement {
    pub fn iban(&self) -> &str {
        &self.account_statement.info.iban
    }

    pub fn currency(&self) -> &str {
        &self.account_statement.info.currency
    }

    pub fn transfers(&self) -> &[FioTransfer] {
        &self.account_statement.transaction_list.transaction
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
