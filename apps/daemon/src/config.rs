//! Environment-driven configuration of the daemon.

use std::path::PathBuf;
use std::time::Duration;

use tracing::error;

use fiosync_core::config::{
    parse_jobs, SyncConfig, DEFAULT_BATCH_SIZE, DEFAULT_DATABASE_URL, DEFAULT_FIO_API_URL,
    DEFAULT_LEDGER_URL, DEFAULT_LOG_LEVEL,
};
use fiosync_core::sync::DEFAULT_SYNC_INTERVAL_SECS;
use fiosync_core::{Error, Result};

const ENV_TENANT: &str = "FIO_SYNC_TENANT";
const ENV_LEDGER_URL: &str = "FIO_SYNC_LEDGER_URL";
const ENV_FIO_URL: &str = "FIO_SYNC_FIO_URL";
const ENV_ACCOUNTS_BATCH_SIZE: &str = "FIO_SYNC_ACCOUNTS_BATCH_SIZE";
const ENV_TRANSACTIONS_BATCH_SIZE: &str = "FIO_SYNC_TRANSACTIONS_BATCH_SIZE";
const ENV_CHECKPOINT_NAMESPACE: &str = "FIO_SYNC_CHECKPOINT_NAMESPACE";
const ENV_INTERVAL_SECS: &str = "FIO_SYNC_INTERVAL_SECS";
const ENV_DATABASE_URL: &str = "FIO_SYNC_DATABASE_URL";
const ENV_LOG_LEVEL: &str = "FIO_SYNC_LOG_LEVEL";
const ENV_ACCOUNTS: &str = "FIO_SYNC_ACCOUNTS";
const ENV_RUN_ONCE: &str = "FIO_SYNC_RUN_ONCE";
const ENV_METRICS_OUTPUT: &str = "FIO_SYNC_METRICS_OUTPUT";
const ENV_METRICS_REFRESH_SECS: &str = "FIO_SYNC_METRICS_REFRESH_SECS";

const DEFAULT_METRICS_OUTPUT: &str = "/tmp";
const DEFAULT_METRICS_REFRESH_SECS: u64 = 1;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub sync: SyncConfig,
    /// Run a single pass and exit instead of looping.
    pub run_once: bool,
    /// Directory the metrics file is written to.
    pub metrics_output: PathBuf,
    pub metrics_refresh: Duration,
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Trimmed, non-empty value of a variable.
fn lookup_value(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn lookup_url(lookup: &impl Fn(&str) -> Option<String>, key: &str, fallback: &str) -> String {
    lookup_value(lookup, key)
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn lookup_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    fallback: T,
) -> T {
    match lookup_value(lookup, key) {
        None => fallback,
        Some(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            error!("invalid value of variable {}", key);
            fallback
        }),
    }
}

fn lookup_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> bool {
    matches!(
        lookup_value(lookup, key).map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}

/// Log level is needed before logging exists, so it is read on its own.
pub fn log_level() -> String {
    lookup_value(&process_env, ENV_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

pub fn load_config() -> Result<DaemonConfig> {
    load_config_from(process_env)
}

pub fn load_config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<DaemonConfig> {
    let tenant = lookup_value(&lookup, ENV_TENANT)
        .ok_or_else(|| Error::config(format!("missing required variable {}", ENV_TENANT)))?;

    let mut sync = SyncConfig::new(tenant);
    sync.ledger_url = lookup_url(&lookup, ENV_LEDGER_URL, DEFAULT_LEDGER_URL);
    sync.fio_url = lookup_url(&lookup, ENV_FIO_URL, DEFAULT_FIO_API_URL);
    sync.accounts_batch_size = lookup_number(&lookup, ENV_ACCOUNTS_BATCH_SIZE, DEFAULT_BATCH_SIZE);
    sync.transactions_batch_size =
        lookup_number(&lookup, ENV_TRANSACTIONS_BATCH_SIZE, DEFAULT_BATCH_SIZE);
    if let Some(namespace) = lookup_value(&lookup, ENV_CHECKPOINT_NAMESPACE) {
        sync.checkpoint_namespace = namespace;
    }
    sync.sync_interval = Duration::from_secs(lookup_number(
        &lookup,
        ENV_INTERVAL_SECS,
        DEFAULT_SYNC_INTERVAL_SECS,
    ));
    sync.database_url = lookup_value(&lookup, ENV_DATABASE_URL)
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
    sync.log_level =
        lookup_value(&lookup, ENV_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    sync.jobs = parse_jobs(&lookup_value(&lookup, ENV_ACCOUNTS).unwrap_or_default())?;
    sync.validate()?;

    Ok(DaemonConfig {
        sync,
        run_once: lookup_flag(&lookup, ENV_RUN_ONCE),
        metrics_output: lookup_value(&lookup, ENV_METRICS_OUTPUT)
            .map(|v| PathBuf::from(v.trim_end_matches('/')))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_METRICS_OUTPUT)),
        metrics_refresh: Duration::from_secs(
            lookup_number(&lookup, ENV_METRICS_REFRESH_SECS, DEFAULT_METRICS_REFRESH_SECS).max(1),
        ),
    })
}
