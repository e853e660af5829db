use std::future::Future;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs a task immediately and then once per period until cancelled.
///
/// Each run is awaited before the next tick, so runs never overlap. A run that
/// outlasts the period pushes the following tick back instead of bursting.
/// Cancelling drops an in-flight run at its next await point.
pub struct Scheduler {
    period: Duration,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(period: Duration, cancel: CancellationToken) -> Scheduler {
        Scheduler { period, cancel }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns the number of completed runs once the token is cancelled.
    pub async fn run<F, Fut>(&self, mut task: F) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut runs = 0;

        info!(period_secs = self.period.as_secs(), "scheduler started");
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = task() => runs += 1,
            }
        }
        info!(runs, "scheduler stopped");

        runs
    }
}
