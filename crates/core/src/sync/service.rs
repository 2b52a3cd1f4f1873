//! Sync cycle: checkpoint -> statement -> accounts -> transactions.

use std::sync::Arc;
use std::time::Instant;

use log::{error, info, warn};
use serde::Serialize;

use super::tenant::Tenant;
use crate::config::{mask_token, SyncJob};
use crate::errors::Result;
use crate::fio::{extract_unique_core_accounts, to_core_account_statement, BankFeed};

/// Outcome of one synchronized account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub account_number: String,
    pub accounts: usize,
    pub transactions: usize,
    pub transfers: usize,
    pub checkpoint: Option<i64>,
    pub duration_ms: i64,
}

/// Outcome of a pass over all configured jobs.
#[derive(Debug, Default)]
pub struct SyncRunSummary {
    pub reports: Vec<SyncReport>,
    pub failed: usize,
}

pub struct SyncService {
    bank_feed: Arc<dyn BankFeed>,
    tenant: Tenant,
    jobs: Vec<SyncJob>,
}

impl SyncService {
    pub fn new(bank_feed: Arc<dyn BankFeed>, tenant: Tenant, jobs: Vec<SyncJob>) -> Self {
        Self {
            bank_feed,
            tenant,
            jobs,
        }
    }

    pub fn jobs(&self) -> &[SyncJob] {
        &self.jobs
    }

    /// Synchronizes one bank account into the tenant's ledger.
    pub async fn sync_account(&self, job: &SyncJob) -> Result<SyncReport> {
        let started_at = Instant::now();
        let checkpoint = self
            .tenant
            .get_transaction_checkpoint(&job.account_number)
            .await?;
        info!(
            "Synchronizing account {} (token {}) of tenant {} from checkpoint {:?}",
            job.account_number,
            mask_token(&job.token),
            self.tenant.name(),
            checkpoint
        );

        let statement = self
            .bank_feed
            .get_account_statement(&job.token, checkpoint, true)
            .await?;
        if statement.iban() != job.account_number {
            warn!(
                "Statement account {} differs from configured account {}, \
                 checkpoint stays keyed by the configured one",
                statement.iban(),
                job.account_number
            );
        }

        let core_statement = to_core_account_statement(&statement)?;
        let accounts = extract_unique_core_accounts(&statement);
        let account_count = accounts.len();
        let transaction_count = core_statement.transactions.len();
        let transfer_count: usize = core_statement
            .transactions
            .iter()
            .map(|t| t.transfers.len())
            .sum();

        self.tenant.create_missing_accounts(accounts).await?;
        // Checkpoints are read and written under the configured account.
        self.tenant
            .create_transactions(core_statement.transactions, &job.account_number)
            .await?;

        let checkpoint = self
            .tenant
            .get_transaction_checkpoint(&job.account_number)
            .await?;

        Ok(SyncReport {
            account_number: job.account_number.clone(),
            accounts: account_count,
            transactions: transaction_count,
            transfers: transfer_count,
            checkpoint,
            duration_ms: started_at.elapsed().as_millis() as i64,
        })
    }

    /// Runs every configured job in order. A failing job is logged and
    /// counted; the remaining jobs still run.
    pub async fn sync_all(&self) -> SyncRunSummary {
        let mut summary = SyncRunSummary::default();

        for job in &self.jobs {
            match self.sync_account(job).await {
                Ok(report) => {
                    info!(
                        "Synchronized account {}: {} transactions, {} transfers in {} ms",
                        report.account_number,
                        report.transactions,
                        report.transfers,
                        report.duration_ms
                    );
                    summary.reports.push(report);
                }
                Err(err) => {
                    error!("Synchronization of account {} failed: {}", job.account_number, err);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::errors::Error;
    use crate::fio::{
        AccountStatement, FioAccountStatement, FioTransfer, FioValue, StatementInfo,
        TransactionList,
    };
    use crate::sync::tenant::tests::{FakeLedger, RecordingCheckpoints};
    use crate::sync::CheckpointStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBankFeed {
        statements: HashMap<String, FioAccountStatement>,
        calls: Mutex<Vec<(String, Option<i64>, bool)>>,
    }

    #[async_trait]
    impl BankFeed for FakeBankFeed {
        async fn get_account_statement(
            &self,
            token: &str,
            from_transaction_id: Option<i64>,
            allow_retry: bool,
        ) -> Result<FioAccountStatement> {
            self.calls
                .lock()
                .unwrap()
                .push((token.to_string(), from_transaction_id, allow_retry));
            self.statements
                .get(token)
                .cloned()
                .ok_or_else(|| Error::RateLimited("too early".to_string()))
        }
    }

    fn transfer(
        amount: rust_decimal::Decimal,
        counterparty: Option<&str>,
        transfer_id: i64,
        transaction_id: i64,
    ) -> FioTransfer {
        FioTransfer {
            value_date: FioValue::new("2023-01-05+0100".to_string()),
            amount: FioValue::new(amount),
            counterparty: counterparty.map(|c| FioValue::new(c.to_string())),
            transaction_id: FioValue::new(transaction_id),
            transfer_id: FioValue::new(transfer_id),
        }
    }

    fn statement(iban: &str, transfers: Vec<FioTransfer>) -> FioAccountStatement {
        FioAccountStatement {
            account_statement: AccountStatement {
                info: StatementInfo {
                    iban: iban.to_string(),
                    currency: "CZK".to_string(),
                    ..Default::default()
                },
                transaction_list: TransactionList {
                    transaction: transfers,
                },
            },
        }
    }

    fn config() -> SyncConfig {
        let mut config = SyncConfig::new("acme");
        config.transactions_batch_size = 2;
        config
    }

    #[tokio::test]
    async fn sync_account_runs_full_cycle() {
        let mut feed = FakeBankFeed::default();
        feed.statements.insert(
            "token-a".to_string(),
            statement(
                "CZ001",
                vec![
                    transfer(dec!(-150), None, 99, 5),
                    transfer(dec!(-2), None, 100, 5),
                    transfer(dec!(300), Some("CZ777"), 101, 6),
                    transfer(dec!(-10), Some("CZ888"), 102, 7),
                ],
            ),
        );
        let feed = Arc::new(feed);
        let ledger = Arc::new(FakeLedger::with_accounts(&["CZ001"]));
        let checkpoints = Arc::new(RecordingCheckpoints::default());
        checkpoints.set("acme", "CZ001", 4).await.unwrap();
        let tenant = Tenant::new(&config(), ledger.clone(), checkpoints.clone());
        let job = SyncJob::new("CZ001", "token-a");
        let service = SyncService::new(feed.clone(), tenant, vec![job.clone()]);

        let report = service.sync_account(&job).await.unwrap();

        assert_eq!(
            *feed.calls.lock().unwrap(),
            vec![("token-a".to_string(), Some(4), true)]
        );
        let mut created = ledger.created_accounts.lock().unwrap().clone();
        created.sort();
        assert_eq!(created, vec!["CZ777", "CZ888", "FIO"]);
        let mut submitted = ledger.transactions.lock().unwrap().clone();
        submitted.sort();
        assert_eq!(submitted, vec!["5", "6", "7"]);
        assert_eq!(
            report,
            SyncReport {
                account_number: "CZ001".to_string(),
                accounts: 4,
                transactions: 3,
                transfers: 4,
                checkpoint: Some(0),
                duration_ms: report.duration_ms,
            }
        );
    }

    #[tokio::test]
    async fn sync_all_continues_after_failed_job() {
        let mut feed = FakeBankFeed::default();
        feed.statements.insert(
            "good".to_string(),
            statement("CZ002", vec![transfer(dec!(1), None, 1, 1)]),
        );
        let tenant = Tenant::new(
            &config(),
            Arc::new(FakeLedger::default()),
            Arc::new(RecordingCheckpoints::default()),
        );
        let service = SyncService::new(
            Arc::new(feed),
            tenant,
            vec![SyncJob::new("CZ001", "missing"), SyncJob::new("CZ002", "good")],
        );

        let summary = service.sync_all().await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].account_number, "CZ002");
        assert_eq!(summary.reports[0].checkpoint, Some(0));
    }

    #[tokio::test]
    async fn checkpoint_follows_configured_account_when_iban_differs() {
        let mut feed = FakeBankFeed::default();
        feed.statements.insert(
            "token-a".to_string(),
            statement(
                "CZ999",
                vec![transfer(dec!(-1), None, 1, 1), transfer(dec!(-2), None, 2, 2)],
            ),
        );
        let feed = Arc::new(feed);
        let checkpoints = Arc::new(RecordingCheckpoints::default());
        let tenant = Tenant::new(&config(), Arc::new(FakeLedger::default()), checkpoints.clone());
        let job = SyncJob::new("CZ001", "token-a");
        let service = SyncService::new(feed.clone(), tenant, vec![job.clone()]);

        service.sync_account(&job).await.unwrap();
        service.sync_account(&job).await.unwrap();

        let calls = feed.calls.lock().unwrap().clone();
        assert_eq!(calls[0].1, None);
        assert_eq!(calls[1].1, Some(1));
        assert!(checkpoints
            .writes
            .lock()
            .unwrap()
            .iter()
            .all(|(_, account, _)| account == "CZ001"));
    }
}
