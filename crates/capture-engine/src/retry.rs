//! Bounded retry with exponential backoff for storage writes.

use std::sync::Arc;
use std::time::Duration;

use deskreel_common::config::StorageSettings;
use deskreel_common::error::{DeskreelError, DeskreelResult};

/// How often and how patiently a failed write is retried within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never below one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each one after.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&StorageSettings::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.max_attempts, settings.initial_backoff())
    }

    /// Delay after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor)
    }

    /// Run a blocking operation on the blocking pool, retrying transient
    /// failures. Non-transient errors are returned immediately.
    pub async fn run_blocking<T, F>(&self, operation: &str, op: F) -> DeskreelResult<T>
    where
        F: Fn() -> DeskreelResult<T> + Send + Sync + 'static,
        T: Send + 'static,
    {
        let op = Arc::new(op);
        let mut attempt = 1;
        loop {
            let call = Arc::clone(&op);
            let result = tokio::task::spawn_blocking(move || (*call)())
                .await
                .map_err(|e| DeskreelError::Other(e.into()))
                .and_then(|r| r);

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Write failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() {
                        tracing::error!(
                            operation,
                            attempts = attempt,
                            error = %e,
                            "Write abandoned after retries"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }
}
