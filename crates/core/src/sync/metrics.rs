//! Running totals of synchronization outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::service::SyncRunSummary;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetrics {
    pub cycles: u64,
    pub synchronized_accounts: u64,
    pub failed_accounts: u64,
    /// Accounts checked against the ledger, counterparties included.
    pub reconciled_accounts: u64,
    pub transactions: u64,
    pub transfers: u64,
    pub last_cycle_duration_ms: i64,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

impl SyncMetrics {
    pub fn record_cycle(
        &mut self,
        summary: &SyncRunSummary,
        duration_ms: i64,
        finished_at: DateTime<Utc>,
    ) {
        self.cycles += 1;
        self.synchronized_accounts += summary.reports.len() as u64;
        self.failed_accounts += summary.failed as u64;
        for report in &summary.reports {
            self.reconciled_accounts += report.accounts as u64;
            self.transactions += report.transactions as u64;
            self.transfers += report.transfers as u64;
        }
        self.last_cycle_duration_ms = duration_ms;
        self.last_cycle_at = Some(finished_at);
    }
}
