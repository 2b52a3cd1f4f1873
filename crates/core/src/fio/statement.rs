//! Conversion of a FIO account statement into the core ledger model.
//!
//! A statement lists transfers ("pohyb"). Transfers issued by the same
//! instruction ("pokyn") share a transaction id, so the ledger receives one
//! transaction per instruction holding all of its transfers.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;

use super::model::{FioAccountStatement, FioTransfer};
use crate::errors::{Error, Result};
use crate::ledger::{CoreAccount, CoreAccountStatement, CoreTransaction, CoreTransfer};

/// Provenance tag written on every transaction created by the sync.
pub const BLAME: &str = "fio-sync";

/// Counterparty used when the feed does not report one (fees, interest).
pub const UNKNOWN_COUNTERPARTY: &str = "FIO";

fn counterparty_account_number(transfer: &FioTransfer) -> &str {
    transfer
        .counterparty
        .as_ref()
        .map(|node| node.value.as_str())
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_COUNTERPARTY)
}

fn debit_account_number<'a>(transfer: &'a FioTransfer, main_account_number: &'a str) -> &'a str {
    if transfer.amount.value > Decimal::ZERO {
        counterparty_account_number(transfer)
    } else {
        main_account_number
    }
}

fn credit_account_number<'a>(transfer: &'a FioTransfer, main_account_number: &'a str) -> &'a str {
    if transfer.amount.value < Decimal::ZERO {
        counterparty_account_number(transfer)
    } else {
        main_account_number
    }
}

/// Parses a feed date (`2023-01-05+0100`) as local midnight at the given
/// offset. A date without an offset is taken as UTC midnight.
pub fn parse_value_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    let (date_part, offset_part) = match value.get(10..) {
        Some(rest) => (&value[..10], rest),
        None => (value, ""),
    };

    if offset_part.is_empty() {
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|e| Error::invalid_statement(format!("Invalid value date '{}': {}", value, e)))?;
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    DateTime::parse_from_str(
        &format!("{}T00:00:00{}", date_part, offset_part),
        "%Y-%m-%dT%H:%M:%S%z",
    )
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::invalid_statement(format!("Invalid value date '{}': {}", value, e)))
}

fn to_core_transfer(
    transfer: &FioTransfer,
    main_account_number: &str,
    main_account_currency: &str,
) -> Result<CoreTransfer> {
    let value_date = parse_value_date(&transfer.value_date.value)?;

    Ok(CoreTransfer {
        id: transfer.transfer_id.value.to_string(),
        value_date: value_date.to_rfc3339_opts(SecondsFormat::Millis, true),
        credit: credit_account_number(transfer, main_account_number).to_string(),
        debit: debit_account_number(transfer, main_account_number).to_string(),
        amount: transfer.amount.value.abs().normalize().to_string(),
        currency: main_account_currency.to_string(),
    })
}

fn to_core_transactions(
    transfers: &[FioTransfer],
    main_account_number: &str,
    main_account_currency: &str,
) -> Result<Vec<CoreTransaction>> {
    let mut transactions: Vec<CoreTransaction> = Vec::new();
    let mut positions: HashMap<i64, usize> = HashMap::new();

    for transfer in transfers {
        let core_transfer = to_core_transfer(transfer, main_account_number, main_account_currency)?;
        let transaction_id = transfer.transaction_id.value;

        match positions.get(&transaction_id) {
            Some(&position) => transactions[position].transfers.push(core_transfer),
            None => {
                positions.insert(transaction_id, transactions.len());
                transactions.push(CoreTransaction {
                    id: transaction_id.to_string(),
                    blame: BLAME.to_string(),
                    transfers: vec![core_transfer],
                });
            }
        }
    }

    Ok(transactions)
}

/// Converts a bank statement into core transactions, grouping transfers by
/// transaction id in first-seen order.
pub fn to_core_account_statement(statement: &FioAccountStatement) -> Result<CoreAccountStatement> {
    let main_account_number = statement.iban();
    let main_account_currency = statement.currency();

    Ok(CoreAccountStatement {
        account_number: main_account_number.to_string(),
        transactions: to_core_transactions(
            statement.transfers(),
            main_account_number,
            main_account_currency,
        )?,
    })
}

/// Lists every counterparty referenced by the statement once, in first-seen
/// order, followed by the main account.
///
/// The main account is always appended, even when it already showed up as a
/// counterparty; account reconciliation tolerates the duplicate.
pub fn extract_unique_core_accounts(statement: &FioAccountStatement) -> Vec<CoreAccount> {
    let currency = statement.currency();
    let mut accounts: Vec<CoreAccount> = Vec::new();

    for transfer in statement.transfers() {
        let account_number = counterparty_account_number(transfer);
        if accounts.iter().any(|a| a.account_number == account_number) {
            continue;
        }
        accounts.push(CoreAccount::unchecked(account_number, currency));
    }

    accounts.push(CoreAccount::unchecked(statement.iban(), currency));
    accounts
}
