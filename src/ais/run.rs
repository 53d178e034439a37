use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::ais::{AssistantService, Run, RunId, ThreadId};
use crate::{Error, Result};

// region: --- Constants
const POLLING_DURATION_MS: u64 = 500;
const MAX_POLLING_DURATION_MS: u64 = 5_000;
const POLLING_TIMEOUT_SEC: u64 = 600;
// endregion: --- Constants

// region: --- PollConfig

/// How a run is waited on.
///
/// `backoff` multiplies the interval after each fetch, capped at
/// `max_interval`. A factor of `1.0` keeps the interval fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub interval: Duration,
    pub backoff: f64,
    pub max_interval: Duration,
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(POLLING_DURATION_MS),
            backoff: 1.0,
            max_interval: Duration::from_millis(MAX_POLLING_DURATION_MS),
            timeout: Some(Duration::from_secs(POLLING_TIMEOUT_SEC)),
        }
    }
}

impl PollConfig {
    fn next_interval(&self, current: Duration) -> Duration {
        let max = self.max_interval;
        if self.backoff.is_nan() || self.backoff <= 1.0 {
            return current.min(max);
        }

        // Capped in f64 first, the product may not fit a `Duration`.
        let next = current.as_secs_f64() * self.backoff;
        if next >= max.as_secs_f64() {
            return max;
        }
        Duration::try_from_secs_f64(next).unwrap_or(max)
    }
}

// endregion: --- PollConfig

// region: --- Wait

/// Polls until the run leaves the queued/in-progress states.
///
/// Each round fetches the run, then suspends for the current interval. The
/// suspension ends early with `RunCancelled` when `true` is sent on `cancel`
/// after the wait started. A value already held on entry is ignored.
pub async fn wait_on_run(
    svc: &dyn AssistantService,
    thread_id: &ThreadId,
    mut run: Run,
    config: &PollConfig,
    mut cancel: Option<&mut watch::Receiver<bool>>,
) -> Result<Run> {
    let started = Instant::now();
    let mut interval = config.interval;

    if let Some(cancel) = cancel.as_deref_mut() {
        cancel.borrow_and_update();
    }

    while run.status.is_pending() {
        if let Some(timeout) = config.timeout {
            let waited = started.elapsed();
            if waited >= timeout {
                return Err(Error::RunTimeout {
                    run_id: run.id.to_string(),
                    waited,
                });
            }
        }

        run = svc.retrieve_run(thread_id, &run.id).await?;
        debug!(run_id = %run.id, status = %run.status, "polled run");

        suspend(interval, &run.id, cancel.as_deref_mut()).await?;
        interval = config.next_interval(interval);
    }

    Ok(run)
}

async fn suspend(
    duration: Duration,
    run_id: &RunId,
    cancel: Option<&mut watch::Receiver<bool>>,
) -> Result<()> {
    let Some(cancel) = cancel else {
        sleep(duration).await;
        return Ok(());
    };

    tokio::select! {
        _ = sleep(duration) => Ok(()),
        true = cancelled(cancel) => Err(Error::RunCancelled {
            run_id: run_id.to_string(),
        }),
    }
}

/// Resolves to `true` on the next `true` sent, `false` once the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) -> bool {
    while cancel.changed().await.is_ok() {
        let value = *cancel.borrow_and_update();
        if value {
            return true;
        }
    }
    false
}

// endregion: --- Wait
