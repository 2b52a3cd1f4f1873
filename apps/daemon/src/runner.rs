//! Interval loop that stops between cycles.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

/// Runs `cycle` immediately and then every `interval` until `shutdown`
/// resolves. A cycle in progress is always finished; the shutdown request is
/// honored before the next one starts.
pub async fn run_until_shutdown<S, C, Fut>(interval: Duration, shutdown: S, mut cycle: C)
where
    S: Future,
    C: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping sync loop");
                break;
            }
            _ = ticker.tick() => cycle().await,
        }
    }
}
