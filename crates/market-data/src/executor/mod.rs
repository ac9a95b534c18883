//! Rate-limited execution of provider calls.
//!
//! Every provider call goes through [`RateLimitedExecutor::execute`], which:
//! - spaces successful calls so sequential requests stay under the provider's
//!   per-minute budget,
//! - retries failures with a short delay, or a long flat cooldown when the
//!   provider reported a rate limit,
//! - falls back to synthetic data once retries are exhausted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::{MarketDataError, RetryClass};
use crate::models::Sourced;
use crate::synthetic::{Synthesize, SyntheticDataGenerator};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default wait after every successful call.
pub const DEFAULT_CALL_SPACING: Duration = Duration::from_millis(1500);

/// Default wait before retrying a transient failure.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Default wait before retrying after the provider rate limited us.
pub const DEFAULT_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);

/// Timing and retry budget for provider calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait after every successful call.
    pub call_spacing: Duration,
    /// Wait before retrying a transient failure.
    pub retry_delay: Duration,
    /// Wait before retrying a rate-limited call. Flat, never scaled.
    pub rate_limit_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            call_spacing: DEFAULT_CALL_SPACING,
            retry_delay: DEFAULT_RETRY_DELAY,
            rate_limit_cooldown: DEFAULT_RATE_LIMIT_COOLDOWN,
        }
    }
}

impl RetryPolicy {
    /// Wait before the next attempt after a failure of class `class`, or
    /// `None` when the failure must not be retried.
    pub fn backoff_for(&self, class: RetryClass) -> Option<Duration> {
        match class {
            RetryClass::Cooldown => Some(self.rate_limit_cooldown),
            RetryClass::Backoff => Some(self.retry_delay),
            RetryClass::Never => None,
        }
    }
}

/// Wraps provider calls with spacing, bounded retry and synthetic fallback.
#[derive(Clone, Debug)]
pub struct RateLimitedExecutor {
    policy: RetryPolicy,
    generator: Arc<SyntheticDataGenerator>,
}

impl RateLimitedExecutor {
    pub fn new(policy: RetryPolicy, generator: Arc<SyntheticDataGenerator>) -> Self {
        Self { policy, generator }
    }

    /// Run `call` with the policy's default retry budget.
    pub async fn execute_default<T, F, Fut>(
        &self,
        call: F,
        fallback: Option<&str>,
    ) -> Result<Sourced<T>, MarketDataError>
    where
        T: Synthesize,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        self.execute(call, fallback, self.policy.max_retries).await
    }

    /// Run `call`, retrying up to `max_retries` times.
    ///
    /// The call is always attempted at least once. When every attempt fails
    /// and `fallback` names a symbol, synthetic data for that symbol is
    /// returned instead of the error.
    pub async fn execute<T, F, Fut>(
        &self,
        mut call: F,
        fallback: Option<&str>,
        max_retries: u32,
    ) -> Result<Sourced<T>, MarketDataError>
    where
        T: Synthesize,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        let mut remaining = max_retries;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let error = match call().await {
                Ok(value) => {
                    tokio::time::sleep(self.policy.call_spacing).await;
                    return Ok(Sourced::live(value));
                }
                Err(e) => e,
            };

            let backoff = self.policy.backoff_for(error.retry_class());

            match backoff {
                Some(wait) if remaining > 0 => {
                    warn!(
                        "Attempt {} failed: {}. Retrying in {:?} ({} retries left)",
                        attempt, error, wait, remaining
                    );
                    tokio::time::sleep(wait).await;
                    remaining -= 1;
                }
                _ => {
                    return match fallback {
                        Some(symbol) => {
                            warn!(
                                "Using synthetic data for {} after {} attempt(s): {}",
                                symbol, attempt, error
                            );
                            Ok(Sourced::synthetic(T::synthesize(&self.generator, symbol)))
                        }
                        None => {
                            debug!("Giving up after {} attempt(s): {}", attempt, error);
                            Err(error)
                        }
                    };
                }
            }
        }
    }
}
