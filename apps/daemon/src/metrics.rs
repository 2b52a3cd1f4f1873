//! Periodic persistence of sync metrics as JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use fiosync_core::sync::{SyncMetrics, SyncRunSummary};

pub struct MetricsPublisher {
    path: PathBuf,
    refresh: Duration,
    metrics: Mutex<SyncMetrics>,
}

impl MetricsPublisher {
    /// Metrics of `tenant` go to `metrics.{tenant}.json` inside `output_dir`.
    pub fn new(output_dir: &Path, tenant: &str, refresh: Duration) -> Self {
        Self {
            path: output_dir.join(format!("metrics.{}.json", tenant)),
            refresh,
            metrics: Mutex::new(SyncMetrics::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn record(&self, summary: &SyncRunSummary, duration_ms: i64) {
        self.metrics
            .lock()
            .await
            .record_cycle(summary, duration_ms, Utc::now());
    }

    pub async fn snapshot(&self) -> SyncMetrics {
        self.metrics.lock().await.clone()
    }

    /// Writes the current totals, replacing the previous file atomically.
    pub async fn persist(&self) -> anyhow::Result<()> {
        let payload = serde_json::to_vec_pretty(&self.snapshot().await)?;
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, payload).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!("Metrics written to {}", self.path.display());
        Ok(())
    }

    /// Persists the metrics every refresh interval until the task is aborted.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.refresh);
            loop {
                ticker.tick().await;
                if let Err(err) = self.persist().await {
                    warn!("Unable to write metrics to {}: {}", self.path.display(), err);
                }
            }
        })
    }
}
