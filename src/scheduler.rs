use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Periodic stimulus source running on its own tokio task.
///
/// The timer re-arms itself `interval` after each firing completes, so
/// firings are not phase-locked to the start time: any time spent inside
/// the callback, or lost to a busy runtime, pushes every later firing back.
/// This drift is accepted.
pub struct EventScheduler {
    interval: Duration,
    fired: Arc<AtomicU64>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl EventScheduler {
    /// Spawns the timer task; `on_fire` runs once per interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(interval: Duration, mut on_fire: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (shutdown, mut shutdown_rx) = oneshot::channel();
        let fired = Arc::new(AtomicU64::new(0));
        let counter = fired.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = tokio::time::sleep(interval) => {
                        on_fire();
                        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                        debug!(firing = n, "stimulus fired");
                    }
                }
            }
        });

        info!(interval_ms = interval.as_millis() as u64, "stimulus scheduler started");
        Self {
            interval,
            fired,
            shutdown: Some(shutdown),
            handle: Some(handle),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Firings completed so far.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::SeqCst)
    }

    /// Stops the timer and waits for the task to finish.
    ///
    /// Once this returns no firing is in flight and none will follow.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!(fired = self.fired(), "stimulus scheduler stopped");
    }
}

impl Drop for EventScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_interval() {
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let sched = EventScheduler::start(Duration::from_millis(100), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(sched.fired(), 3);
        sched.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_fires_after_stop() {
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let sched = EventScheduler::start(Duration::from_millis(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(55)).await;
        sched.stop().await;
        let after_stop = count.load(Ordering::SeqCst);
        assert_eq!(after_stop, 5);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }
}
