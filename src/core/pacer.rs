//! Minimum-interval pacing between remote requests.
//!
//! GitHub rate-limits unauthenticated clients aggressively, so both the API
//! client and the download engine keep a minimum spacing between requests.
//! The pacer is an explicit value owned by its client rather than
//! process-global state.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: Mutex::new(None),
        }
    }

    /// Sleeps until at least `interval` has passed since the previous call
    /// returned, then records the new start. Holding the lock across the
    /// sleep serializes callers sharing one pacer.
    pub async fn wait(&self) {
        let mut last_run = self.last_run.lock().await;
        if let Some(last) = *last_run {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last_run = Some(Instant::now());
    }
}
