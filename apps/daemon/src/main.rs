//! Periodic synchronization of FIO bank statements into the core ledger.

mod config;
mod context;
mod metrics;
mod runner;

use std::sync::Arc;
use std::time::Instant;

use anyhow::bail;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::context::ServiceContext;
use crate::metrics::MetricsPublisher;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// One pass over all accounts; returns the number of failed accounts.
async fn run_cycle(context: &ServiceContext, metrics: &MetricsPublisher) -> usize {
    let started_at = Instant::now();
    let summary = context.sync_service.sync_all().await;
    let duration_ms = started_at.elapsed().as_millis() as i64;
    info!(
        "Sync cycle finished in {} ms: {} synchronized, {} failed",
        duration_ms,
        summary.reports.len(),
        summary.failed
    );
    metrics.record(&summary, duration_ms).await;
    summary.failed
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(&config::log_level());

    let config = config::load_config()?;
    info!(
        "Starting FIO sync for tenant {} with {} account(s)",
        config.sync.tenant,
        config.sync.jobs.len()
    );

    let context = ServiceContext::new(&config.sync)?;
    if let Err(err) = context.log_checkpoints() {
        warn!("Unable to read stored checkpoints: {}", err);
    }
    let metrics = Arc::new(MetricsPublisher::new(
        &config.metrics_output,
        &config.sync.tenant,
        config.metrics_refresh,
    ));
    info!("Metrics are written to {}", metrics.path().display());

    if config.run_once {
        let failed = run_cycle(&context, &metrics).await;
        metrics.persist().await?;
        if failed > 0 {
            bail!("{} account(s) failed to synchronize", failed);
        }
        return Ok(());
    }

    let metrics_task = Arc::clone(&metrics).spawn();
    let (context_ref, metrics_ref) = (&context, metrics.as_ref());
    runner::run_until_shutdown(config.sync.sync_interval, tokio::signal::ctrl_c(), move || {
        async move {
            run_cycle(context_ref, metrics_ref).await;
        }
    })
    .await;

    metrics_task.abort();
    if let Err(err) = metrics.persist().await {
        warn!("Unable to write final metrics: {}", err);
    }
    Ok(())
}
