//! Periodic refresh ticks with deterministic shutdown.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

/// Owns a background task that calls `on_tick` once per period. The task is
/// aborted by `stop` or when the timer is dropped.
pub struct RefreshTimer {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTimer {
    /// Starts ticking. The first tick comes one full period after start.
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Refresh timer fired");
                on_tick();
            }
        });

        Self {
            period,
            handle: Some(handle),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Refresh timer stopped");
        }
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
