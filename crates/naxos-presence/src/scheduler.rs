//! Deferred work for the debounce window.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs offline checks once the debounce delay has elapsed.
///
/// Scheduled work is never cancelled. Each check decides for itself whether
/// it still applies, so a reconnect only has to update the table.
#[derive(Debug, Clone)]
pub struct OfflineScheduler {
    delay: Duration,
}

impl OfflineScheduler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` on the runtime after the configured delay.
    pub fn schedule<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        })
    }
}
