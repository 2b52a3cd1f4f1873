//! Core ledger API client.
//!
//! All endpoints are tenant scoped: `{base_url}/v1/{tenant}/core/...`.

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use std::time::Duration;

use fiosync_core::ledger::{CoreAccount, CoreTransaction, LedgerApi};

use crate::error::{LedgerError, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct LedgerClient {
    client: reqwest::Client,
    api_url: String,
}

impl LedgerClient {
    /// Create a client for one tenant.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root of the ledger service (e.g., "https://127.0.0.1:4401")
    /// * `tenant` - Tenant whose ledger receives the data
    pub fn new(base_url: &str, tenant: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_url: format!(
                "{}/v1/{}/core",
                base_url.trim_end_matches('/'),
                urlencoding::encode(tenant)
            ),
        })
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("Ledger response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("Ledger response error ({}): {}", status, preview);
    }

    /// Check a response, turning 404 into [`LedgerError::NotFound`].
    async fn check_response(response: reqwest::Response, resource: &str) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            return Err(LedgerError::api(
                status.as_u16(),
                format!("Request for {} failed: {}", resource, body),
            ));
        }
        Ok(body)
    }

    async fn put<T: Serialize + ?Sized>(&self, url: &str, payload: &T, resource: &str) -> Result<()> {
        let response = self.client.put(url).json(payload).send().await?;
        Self::check_response(response, resource).await.map(|_| ())
    }

    /// Probe an account.
    ///
    /// GET /v1/{tenant}/core/account/{accountNumber}
    pub async fn get_account(&self, account_number: &str) -> Result<()> {
        let url = format!(
            "{}/account/{}",
            self.api_url,
            urlencoding::encode(account_number)
        );
        let response = self.client.get(&url).send().await?;
        Self::check_response(response, &format!("account {}", account_number))
            .await
            .map(|_| ())
    }

    /// Create an account.
    ///
    /// PUT /v1/{tenant}/core/account/
    pub async fn create_account(&self, account: &CoreAccount) -> Result<()> {
        let url = format!("{}/account/", self.api_url);
        debug!("Creating account: {:?}", account);
        self.put(&url, account, &format!("account {}", account.account_number))
            .await
    }

    /// Submit a transaction.
    ///
    /// PUT /v1/{tenant}/core/transaction
    pub async fn create_transaction(&self, transaction: &CoreTransaction) -> Result<()> {
        let url = format!("{}/transaction", self.api_url);
        self.put(&url, transaction, &format!("transaction {}", transaction.id))
            .await
    }
}

#[async_trait]
impl LedgerApi for LedgerClient {
    async fn get_account(&self, account_number: &str) -> fiosync_core::Result<()> {
        Ok(LedgerClient::get_account(self, account_number).await?)
    }

    async fn create_account(&self, account: &CoreAccount) -> fiosync_core::Result<()> {
        Ok(LedgerClient::create_account(self, account).await?)
    }

    async fn create_transaction(&self, transaction: &CoreTransaction) -> fiosync_core::Result<()> {
        Ok(LedgerClient::create_transaction(self, transaction).await?)
    }
}
