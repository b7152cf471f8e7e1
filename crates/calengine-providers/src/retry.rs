//! Bounded retry with exponential backoff around a whole fetch.
//!
//! The retry scope is the aggregate operation ("fetch all records for a
//! source"). Sub-requests inside a source never retry on their own, so retry
//! counts do not compound.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::source::RecordSource;

/// Retry configuration for a fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total tries, including the first one.
    pub max_attempts: u32,
    /// Wait after the first failure.
    pub min_wait: Duration,
    /// Upper bound for any single wait.
    pub max_wait: Duration,
    /// Growth factor between consecutive waits.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_wait: Duration::from_secs(4),
            max_wait: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_wait: Duration, max_wait: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts,
            min_wait,
            max_wait,
            multiplier,
        }
    }

    /// A policy that tries once and never waits.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Wait after failed attempt number `attempt` (1-based):
    /// `min(max_wait, min_wait * multiplier^(attempt-1))`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base = self.min_wait.as_secs_f64();
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let delay = base * self.multiplier.powi(exponent);
        let max = self.max_wait.as_secs_f64();

        Duration::from_secs_f64(delay.min(max).max(0.0))
    }

    /// Every wait a fully failing run goes through, in order.
    ///
    /// There is no wait after the last attempt.
    pub fn wait_schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|a| self.delay_for(a)).collect()
    }
}

/// Runs fetch operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct ResilientFetcher {
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches every record from `source`, retrying transient failures.
    pub async fn fetch_all<S>(&self, source: &S) -> ProviderResult<Vec<S::Record>>
    where
        S: RecordSource + ?Sized,
    {
        self.run(source.name(), || source.fetch_all()).await
    }

    /// Runs `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// The returned error carries the attempt count and the `name` of the source.
    pub async fn run<T, F, Fut>(&self, name: &str, mut operation: F) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(source = name, attempt, "fetch succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_retryable() => {
                    warn!(source = name, attempt, error = %e, "permanent failure, not retrying");
                    return Err(finish(e, name, attempt));
                }
                Err(e) if attempt >= max_attempts => {
                    warn!(source = name, attempt, error = %e, "giving up after final attempt");
                    return Err(finish(e, name, attempt));
                }
                Err(e) => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        source = name,
                        attempt,
                        max_attempts,
                        delay_secs = delay.as_secs_f64(),
                        error = %e,
                        "fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn finish(error: ProviderError, name: &str, attempts: u32) -> ProviderError {
    let error = error.with_attempts(attempts);
    if error.provider().is_some() {
        error
    } else {
        error.with_provider(name)
    }
}
