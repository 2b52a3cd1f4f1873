//! Startup configuration handed to every sync component.

use std::fmt;
use std::time::Duration;

use crate::errors::{Error, Result};
use crate::sync::DEFAULT_SYNC_INTERVAL_SECS;

pub const DEFAULT_FIO_API_URL: &str = "https://www.fio.cz/ib_api/rest";
pub const DEFAULT_LEDGER_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_DATABASE_URL: &str = "fiosync.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// One bank account to synchronize and the API token giving access to it.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncJob {
    pub account_number: String,
    pub token: String,
}

impl SyncJob {
    pub fn new(account_number: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for SyncJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncJob")
            .field("account_number", &self.account_number)
            .field("token", &mask_token(&self.token))
            .finish()
    }
}

/// Keeps the first four characters of a token for log correlation.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    format!("{}***", visible)
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub tenant: String,
    pub ledger_url: String,
    pub fio_url: String,
    pub accounts_batch_size: usize,
    pub transactions_batch_size: usize,
    /// Namespace of the checkpoint entries, the tenant unless overridden.
    pub checkpoint_namespace: String,
    pub sync_interval: Duration,
    pub database_url: String,
    pub log_level: String,
    pub jobs: Vec<SyncJob>,
}

impl SyncConfig {
    /// Configuration with defaults for everything but the tenant.
    pub fn new(tenant: impl Into<String>) -> Self {
        let tenant = tenant.into();
        Self {
            checkpoint_namespace: tenant.clone(),
            tenant,
            ledger_url: DEFAULT_LEDGER_URL.to_string(),
            fio_url: DEFAULT_FIO_API_URL.to_string(),
            accounts_batch_size: DEFAULT_BATCH_SIZE,
            transactions_batch_size: DEFAULT_BATCH_SIZE,
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            jobs: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tenant.trim().is_empty() {
            return Err(Error::config("tenant must not be empty"));
        }
        if self.accounts_batch_size == 0 {
            return Err(Error::config("accounts batch size must be positive"));
        }
        if self.transactions_batch_size == 0 {
            return Err(Error::config("transactions batch size must be positive"));
        }
        if self.jobs.is_empty() {
            return Err(Error::config("no accounts configured for synchronization"));
        }
        Ok(())
    }
}

/// Parses `IBAN=token` pairs separated by commas.
pub fn parse_jobs(raw: &str) -> Result<Vec<SyncJob>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (account_number, token) = entry
                .split_once('=')
                .ok_or_else(|| Error::config(format!("expected IBAN=token, got '{}'", mask_token(entry))))?;
            let (account_number, token) = (account_number.trim(), token.trim());
            if account_number.is_empty() || token.is_empty() {
                return Err(Error::config(format!(
                    "account number and token must not be empty in '{}'",
                    mask_token(entry)
                )));
            }
            Ok(SyncJob::new(account_number, token))
        })
        .collect()
}
