//! Timing policy for re-reading rows the ERP has just written.
//!
//! The ERP indexes writes asynchronously, so services wait a short settle
//! delay before re-querying and may poll a few times for inserted rows.

use std::sync::Arc;
use std::time::Duration;

use super::ports::{Sleeper, TokioSleeper};

const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_POLL_ATTEMPTS: u32 = 3;

/// Delay and polling policy applied after writes.
#[derive(Clone)]
pub struct ReadAfterWrite {
    settle_delay: Duration,
    poll_attempts: u32,
    poll_interval: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl ReadAfterWrite {
    /// Policy with explicit timings backed by the tokio timer.
    #[must_use]
    pub fn new(settle_delay: Duration, poll_attempts: u32, poll_interval: Duration) -> Self {
        Self {
            settle_delay,
            poll_attempts: poll_attempts.max(1),
            poll_interval,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Default attempts, with `delay` used for both settling and polling.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self::new(delay, DEFAULT_POLL_ATTEMPTS, delay)
    }

    /// Policy that never waits. Used by tests and in-memory backends.
    #[must_use]
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, DEFAULT_POLL_ATTEMPTS, Duration::ZERO)
    }

    /// Replace the sleeper.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Pause applied after each write.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Number of lookups attempted when polling for an inserted row.
    #[must_use]
    pub fn poll_attempts(&self) -> u32 {
        self.poll_attempts
    }

    /// Wait for the ERP to settle after a write.
    pub async fn settle(&self) {
        self.sleeper.sleep(self.settle_delay).await;
    }

    /// Wait between two polling attempts.
    pub async fn pause(&self) {
        self.sleeper.sleep(self.poll_interval).await;
    }
}

impl Default for ReadAfterWrite {
    fn default() -> Self {
        Self::with_delay(DEFAULT_SETTLE_DELAY)
    }
}

impl std::fmt::Debug for ReadAfterWrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadAfterWrite")
            .field("settle_delay", &self.settle_delay)
            .field("poll_attempts", &self.poll_attempts)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;

    #[derive(Default)]
    struct RecordingSleeper(Mutex<Vec<Duration>>);

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.0.lock().expect("sleeper lock").push(duration);
        }
    }

    #[rstest]
    #[tokio::test]
    async fn settle_and_pause_use_configured_delays() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = ReadAfterWrite::new(Duration::from_millis(500), 3, Duration::from_millis(50))
            .with_sleeper(sleeper.clone());

        policy.settle().await;
        policy.pause().await;

        let slept = sleeper.0.lock().expect("sleeper lock").clone();
        assert_eq!(slept, [Duration::from_millis(500), Duration::from_millis(50)]);
    }

    #[rstest]
    fn polling_always_attempts_at_least_once() {
        assert_eq!(ReadAfterWrite::new(Duration::ZERO, 0, Duration::ZERO).poll_attempts(), 1);
        assert_eq!(ReadAfterWrite::default().poll_attempts(), 3);
        assert_eq!(ReadAfterWrite::default().settle_delay(), Duration::from_millis(500));
    }
}
