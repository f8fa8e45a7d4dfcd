//! Delay scheduling
//!
//! Every simulated latency in the crate goes through [`Scheduler`] so that
//! flows can be driven without waiting on the wall clock.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// Source of simulated delays
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Resolve once `duration` has elapsed
    async fn delay(&self, duration: Duration);
}

/// Scheduler backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Scheduler that resolves immediately and records what was asked of it
#[derive(Debug, Default)]
pub struct InstantScheduler {
    requested: Mutex<Vec<Duration>>,
}

impl InstantScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order
    pub fn requested(&self) -> Vec<Duration> {
        match self.requested.lock() {
            Ok(requested) => requested.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Scheduler for InstantScheduler {
    async fn delay(&self, duration: Duration) {
        match self.requested.lock() {
            Ok(mut requested) => requested.push(duration),
            Err(poisoned) => poisoned.into_inner().push(duration),
        }
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_instant_scheduler_records() {
        let scheduler = InstantScheduler::new();
        scheduler.delay(Duration::from_millis(2000)).await;
        scheduler.delay(Duration::from_millis(2500)).await;

        assert_eq!(
            scheduler.requested(),
            vec![Duration::from_millis(2000), Duration::from_millis(2500)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_advances_paused_clock() {
        let start = tokio::time::Instant::now();
        TokioScheduler.delay(Duration::from_secs(30)).await;
        assert!(start.elapsed() >= Duration::from_secs(30));
    }
}
