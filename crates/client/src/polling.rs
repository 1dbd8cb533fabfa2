//! Fixed-interval refresh loop.
//!
//! A poller runs its fetch immediately, then once per interval. The fetch is
//! awaited inside the loop, so a slow fetch delays the next one instead of
//! overlapping it; ticks that elapse meanwhile are skipped. Stopping (or
//! dropping the handle) aborts the task, cancelling a fetch that is still in
//! flight.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Refresh interval for live fatigue and temperature data.
pub const DATA_INTERVAL: Duration = Duration::from_secs(10);

/// Refresh interval for the clock line.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a running poller. Dropping it stops the poller.
#[derive(Debug)]
pub struct PollHandle {
    task: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

/// Start polling `fetch` every `interval`, beginning now.
///
/// # Panics
///
/// Panics if `interval` is zero, like [`tokio::time::interval`].
pub fn start<F, Fut>(mut fetch: F, interval: Duration) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let ticks = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&ticks);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            counter.fetch_add(1, Ordering::Relaxed);
            fetch().await;
        }
    });

    PollHandle {
        task: Some(task),
        ticks,
    }
}

impl PollHandle {
    /// Stop polling. A fetch in flight is cancelled at its next await point.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Stop and wait until the task has wound down.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Cancellation is the expected outcome.
            let _ = task.await;
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Number of fetches started so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
