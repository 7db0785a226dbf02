//! Task monitor.
//!
//! Watches a background worker and reports, once, when it has been running
//! longer than a threshold. The monitor never interrupts the worker.

use crate::core::queue::ProgressEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default time between checks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Supervisor for one running worker.
pub struct TaskMonitor {
    name: String,
    running: Arc<AtomicBool>,
    threshold: Duration,
    check_interval: Duration,
}

impl TaskMonitor {
    /// Create a monitor for the worker whose liveness is `running`.
    pub fn new(name: impl Into<String>, running: Arc<AtomicBool>, threshold: Duration) -> Self {
        Self {
            name: name.into(),
            running,
            threshold,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    /// Override the check interval.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Start watching.
    ///
    /// Holds only a weak reference to `events`, so the channel still closes
    /// as soon as the worker drops its sender. The task ends when the worker
    /// stops or after the warning was sent.
    pub fn spawn(self, events: &mpsc::Sender<ProgressEvent>) -> JoinHandle<bool> {
        let events = events.downgrade();

        tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(self.check_interval);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                if !self.running.load(Ordering::SeqCst) {
                    tracing::debug!("Task '{}' finished, monitor stopping", self.name);
                    return false;
                }

                let elapsed = started.elapsed();
                if elapsed < self.threshold {
                    continue;
                }

                let message = format!(
                    "Task '{}' has been running for {}s (threshold {}s)",
                    self.name,
                    elapsed.as_secs(),
                    self.threshold.as_secs()
                );
                tracing::warn!("{}", message);
                if let Some(sender) = events.upgrade() {
                    let _ = sender.send(ProgressEvent::Stalled(message)).await;
                }
                return true;
            }
        })
    }
}
