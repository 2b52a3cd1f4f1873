//! HTTP client for the FIO bank REST API.
//!
//! The API is cursor based: the caller first moves the server-side cursor of
//! a token (`set-last-date` / `set-last-id`) and then downloads every movement
//! after it with `last`. Downloads of one token are limited to one per
//! 20 seconds, anything faster is answered with `409 Conflict`.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::time::sleep;

use fiosync_core::config::mask_token;
use fiosync_core::fio::{BankFeed, FioAccountStatement};
use fiosync_core::sync::{FIO_EPOCH_DATE, FIO_MANDATORY_WAIT_SECS};

use crate::error::{FioError, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Status FIO answers with when a token is polled too early.
pub(crate) const TOO_EARLY_STATUS: u16 = 409;

#[derive(Debug, Clone)]
pub struct FioClient {
    client: reqwest::Client,
    base_url: String,
    retry_delay: Duration,
}

impl FioClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The FIO REST root (e.g., "https://www.fio.cz/ib_api/rest")
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry_delay: Duration::from_secs(FIO_MANDATORY_WAIT_SECS),
        })
    }

    /// Overrides the pause before retrying a rate-limited download.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("FIO response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("FIO response error ({}): {}", status, preview);
    }

    async fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(FioError::api(status.as_u16(), body));
        }
        Ok(body)
    }

    /// Moves the cursor of `token` to the given date.
    ///
    /// GET /set-last-date/{token}/{date}/
    pub async fn set_last_date(&self, token: &str, date: &str) -> Result<()> {
        let url = format!(
            "{}/set-last-date/{}/{}/",
            self.base_url,
            urlencoding::encode(token),
            date
        );
        self.get(&url).await.map(|_| ())
    }

    /// Moves the cursor of `token` right after the given movement id.
    ///
    /// GET /set-last-id/{token}/{id}/
    pub async fn set_last_id(&self, token: &str, transaction_id: i64) -> Result<()> {
        let url = format!(
            "{}/set-last-id/{}/{}/",
            self.base_url,
            urlencoding::encode(token),
            transaction_id
        );
        self.get(&url).await.map(|_| ())
    }

    async fn move_cursor(&self, token: &str, from_transaction_id: Option<i64>) -> Result<()> {
        match from_transaction_id {
            // A zero checkpoint counts as no checkpoint.
            None | Some(0) => self.set_last_date(token, FIO_EPOCH_DATE).await,
            Some(transaction_id) => self.set_last_id(token, transaction_id).await,
        }
    }

    async fn download(&self, token: &str) -> Result<FioAccountStatement> {
        let url = format!(
            "{}/last/{}/transactions.json",
            self.base_url,
            urlencoding::encode(token)
        );
        let body = self.get(&url).await.map_err(|err| match err.status_code() {
            Some(TOO_EARLY_STATUS) => FioError::TooEarly,
            _ => err,
        })?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Downloads everything after the cursor.
    ///
    /// GET /last/{token}/transactions.json
    ///
    /// A `409` is retried once after the mandatory wait when `allow_retry` is
    /// set; a second `409` surfaces as [`FioError::TooEarly`].
    pub async fn get_last_transactions(
        &self,
        token: &str,
        allow_retry: bool,
    ) -> Result<FioAccountStatement> {
        let mut allow_retry = allow_retry;
        loop {
            match self.download(token).await {
                Err(FioError::TooEarly) if allow_retry => {
                    warn!(
                        "Request to FIO for transactions is too early - waiting {} seconds ...",
                        self.retry_delay.as_secs()
                    );
                    sleep(self.retry_delay).await;
                    allow_retry = false;
                }
                outcome => return outcome,
            }
        }
    }

    /// Moves the cursor and downloads the statement after it.
    pub async fn fetch_statement(
        &self,
        token: &str,
        from_transaction_id: Option<i64>,
        allow_retry: bool,
    ) -> Result<FioAccountStatement> {
        debug!(
            "Fetching FIO statement for token {} from {:?}",
            mask_token(token),
            from_transaction_id
        );
        self.move_cursor(token, from_transaction_id).await?;
        let statement = self.get_last_transactions(token, allow_retry).await?;
        info!(
            "Loaded FIO account statement for account {} ({})",
            statement.iban(),
            statement.account_statement.info.summary()
        );
        Ok(statement)
    }
}

#[async_trait]
impl BankFeed for FioClient {
    async fn get_account_statement(
        &self,
        token: &str,
        from_transaction_id: Option<i64>,
        allow_retry: bool,
    ) -> fiosync_core::Result<FioAccountStatement> {
        Ok(self
            .fetch_statement(token, from_transaction_id, allow_retry)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex as TokioMutex;

    const STATEMENT_BODY: &str = r#"{
        "accountStatement": {
            "info": { "iban": "CZ001", "currency": "CZK", "idLastDownload": 41 },
            "transactionList": {
                "transaction": [
                    {
                        "column0": { "value": "2023-01-05+0100", "name": "Datum", "id": 0 },
                        "column1": { "value": -150.0, "name": "Objem", "id": 1 },
                        "column2": null,
                        "column17": { "value": 5, "name": "ID pokynu", "id": 17 },
                        "column22": { "value": 99, "name": "ID pohybu", "id": 22 }
                    }
                ]
            }
        }
    }"#;

    async fn read_request_path(stream: &mut tokio::net::TcpStream) -> Option<String> {
        let mut buffer = Vec::new();
        loop {
            let mut chunk = [0_u8; 1024];
            let read = stream.read(&mut chunk).await.ok()?;
            if read == 0 {
                return None;
            }
            buffer.extend_from_slice(&chunk[..read]);
            if buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let head = String::from_utf8_lossy(&buffer).to_string();
        head.lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .map(str::to_string)
    }

    async fn start_mock_fio(
        responses: Vec<(u16, &'static str)>,
    ) -> (String, Arc<TokioMutex<Vec<String>>>, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let paths = Arc::new(TokioMutex::new(Vec::new()));
        let scripted = Arc::new(TokioMutex::new(VecDeque::from(responses)));
        let paths_clone = Arc::clone(&paths);

        let handle = tokio::spawn(async move {
            loop {
                let (mut stream, _) = match listener.accept().await {
                    Ok(value) => value,
                    Err(_) => break,
                };
                let Some(path) = read_request_path(&mut stream).await else {
                    continue;
                };
                paths_clone.lock().await.push(path);
                let (status, body) = scripted
                    .lock()
                    .await
                    .pop_front()
                    .unwrap_or((500, "unexpected request"));
                let response = format!(
                    "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.flush().await;
            }
        });

        (format!("http://{}", addr), paths, handle)
    }

    fn client(base_url: &str) -> FioClient {
        FioClient::new(base_url)
            .expect("client")
            .with_retry_delay(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn first_sync_resets_cursor_to_epoch() {
        let (base_url, paths, server) = start_mock_fio(vec![(200, ""), (200, STATEMENT_BODY)]).await;

        let statement = client(&base_url)
            .fetch_statement("tok", None, true)
            .await
            .expect("statement");

        assert_eq!(statement.iban(), "CZ001");
        assert_eq!(statement.transfers().len(), 1);
        assert_eq!(
            *paths.lock().await,
            vec![
                "/set-last-date/tok/1900-01-01/".to_string(),
                "/last/tok/transactions.json".to_string(),
            ]
        );
        server.abort();
    }

    #[tokio::test]
    async fn checkpoint_moves_cursor_by_id() {
        let (base_url, paths, server) = start_mock_fio(vec![(200, ""), (200, STATEMENT_BODY)]).await;

        client(&base_url)
            .fetch_statement("tok", Some(42), true)
            .await
            .expect("statement");

        assert_eq!(paths.lock().await[0], "/set-last-id/tok/42/");
        server.abort();
    }

    #[tokio::test]
    async fn zero_checkpoint_resets_cursor_to_epoch() {
        let (base_url, paths, server) = start_mock_fio(vec![(200, ""), (200, STATEMENT_BODY)]).await;

        client(&base_url)
            .fetch_statement("tok", Some(0), true)
            .await
            .expect("statement");

        assert_eq!(paths.lock().await[0], "/set-last-date/tok/1900-01-01/");
        server.abort();
    }

    #[tokio::test]
    async fn too_early_is_retried_once() {
        let (base_url, paths, server) = start_mock_fio(vec![
            (200, ""),
            (409, "too early"),
            (200, STATEMENT_BODY),
        ])
        .await;

        let statement = client(&base_url)
            .fetch_statement("tok", Some(7), true)
            .await
            .expect("statement after retry");

        assert_eq!(statement.account_statement.info.id_last_download, Some(41));
        assert_eq!(paths.lock().await.len(), 3);
        server.abort();
    }

    #[tokio::test]
    async fn second_too_early_fails_with_wait_message() {
        let (base_url, paths, server) = start_mock_fio(vec![
            (200, ""),
            (409, "too early"),
            (409, "too early"),
            (200, STATEMENT_BODY),
        ])
        .await;

        let err = client(&base_url)
            .fetch_statement("tok", None, true)
            .await
            .unwrap_err();

        assert!(matches!(err, FioError::TooEarly));
        assert!(err.to_string().contains("wait 20 seconds"));
        assert_eq!(paths.lock().await.len(), 3);
        server.abort();
    }

    #[tokio::test]
    async fn too_early_without_retry_fails_immediately() {
        let (base_url, paths, server) =
            start_mock_fio(vec![(200, ""), (409, "too early")]).await;

        let err = client(&base_url)
            .get_account_statement("tok", None, false)
            .await
            .unwrap_err();

        assert!(err.is_rate_limited());
        assert_eq!(paths.lock().await.len(), 2);
        server.abort();
    }

    #[tokio::test]
    async fn cursor_failure_is_not_retried() {
        let (base_url, paths, server) =
            start_mock_fio(vec![(500, "internal"), (200, STATEMENT_BODY)]).await;

        let err = client(&base_url)
            .get_account_statement("tok", Some(3), true)
            .await
            .unwrap_err();

        assert!(matches!(err, fiosync_core::Error::Api { status: 500, .. }));
        assert_eq!(*paths.lock().await, vec!["/set-last-id/tok/3/".to_string()]);
        server.abort();
    }

    #[tokio::test]
    async fn token_is_url_encoded() {
        let (base_url, paths, server) = start_mock_fio(vec![(200, ""), (200, STATEMENT_BODY)]).await;

        client(&base_url)
            .fetch_statement("a/b c", None, false)
            .await
            .expect("statement");

        assert_eq!(paths.lock().await[0], "/set-last-date/a%2Fb%20c/1900-01-01/");
        server.abort();
    }

    #[tokio::test]
    async fn transport_error_does_not_reveal_token() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        drop(listener);

        let err = client(&format!("http://{}", addr))
            .get_account_statement("SUPERSECRETTOKEN123", None, true)
            .await
            .unwrap_err();

        assert!(matches!(err, fiosync_core::Error::Transport { .. }));
        assert!(!err.to_string().contains("SUPERSECRETTOKEN123"));
        assert!(!format!("{:?}", err).contains("SUPERSECRETTOKEN123"));
    }

    #[tokio::test]
    async fn malformed_statement_is_reported() {
        let (base_url, _paths, server) =
            start_mock_fio(vec![(200, ""), (200, "{\"accountStatement\": {}}")]).await;

        let err = client(&base_url)
            .get_account_statement("tok", None, false)
            .await
            .unwrap_err();

        assert!(matches!(err, fiosync_core::Error::InvalidStatement(_)));
        server.abort();
    }
}
