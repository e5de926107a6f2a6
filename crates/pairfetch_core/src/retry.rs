use std::time::Duration;

use pairfetch_logging::{pf_debug, pf_warn};

use crate::Single;

/// How a failing stream is re-run.
///
/// The wait before retry `n` (0-based) is `initial_delay * multiplier^n`. A
/// multiplier of `1.0` gives a constant delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts,
            initial_delay,
            multiplier,
        }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, 1.0)
    }

    /// Delay before the retry with 0-based index `retry_index`, saturating at `Duration::MAX`.
    ///
    /// A zero `initial_delay` stays zero whatever the multiplier.
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }
        let multiplier = if self.multiplier.is_nan() {
            0.0
        } else {
            self.multiplier.max(0.0)
        };
        let exponent = i32::try_from(retry_index).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * multiplier.powi(exponent);
        if secs.is_nan() {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2), 1.0)
    }
}

impl<T: Send + 'static> Single<T> {
    /// Re-runs the source after each failure until it succeeds or `policy` is spent.
    ///
    /// The attempt counter belongs to one run; every new subscription starts at zero.
    /// The last error is forwarded unchanged.
    pub fn retry(&self, policy: RetryPolicy) -> Single<T> {
        let source = self.clone();
        Single::new(move || {
            let source = source.clone();
            async move {
                let mut retries = 0;
                loop {
                    match source.run().await {
                        Ok(value) => return Ok(value),
                        Err(err) if retries < policy.max_attempts => {
                            let delay = policy.delay_for(retries);
                            retries += 1;
                            pf_warn!(
                                "attempt failed ({}); retry {}/{} in {:?}",
                                err,
                                retries,
                                policy.max_attempts,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                        }
                        Err(err) => {
                            if policy.max_attempts > 0 {
                                pf_debug!("retries exhausted after {} attempts", retries + 1);
                            }
                            return Err(err);
                        }
                    }
                }
            }
        })
    }
}
