//! Retry strategies for token requests
//!
//! A policy decides how many attempts to make, whether a particular failure
//! is worth retrying, and how long to wait before the next attempt. Policies
//! are plain strategy objects chosen at construction time; the request loop
//! itself never inspects errors.

use std::fmt;
use std::time::Duration;

use rand::Rng;

use crate::error::TokenRequestError;

/// A strategy governing retries of failed token requests
pub trait RetryPolicy: fmt::Debug + Send + Sync {
    /// The maximum number of attempts, including the first
    fn max_attempts(&self) -> u32;

    /// Decides whether `attempt` (1-based) should be followed by another
    ///
    /// The default implementation allows a retry while attempts remain and
    /// the error is classified transient.
    fn should_retry(&self, attempt: u32, error: &TokenRequestError) -> bool {
        attempt < self.max_attempts() && error.is_transient()
    }

    /// The delay to wait before issuing `attempt` (1-based)
    ///
    /// Never consulted for the first attempt.
    fn delay_before_attempt(&self, attempt: u32) -> Duration;
}

/// A policy that retries immediately, with no delay between attempts
#[derive(Clone, Debug)]
pub struct ImmediateRetry {
    max_attempts: u32,
}

impl Default for ImmediateRetry {
    /// Default policy: three attempts, zero delay
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl ImmediateRetry {
    /// Constructs a policy making up to `max_attempts` attempts
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }
}

impl RetryPolicy for ImmediateRetry {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_before_attempt(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

/// A policy that backs off exponentially with jitter
///
/// The delay before attempt `n` is `base * factor^(n-1)`, capped at
/// `max_delay`, then scaled by a random factor in `[0.5, 1.0]` so that
/// multiple instances recovering from the same outage do not stampede the
/// authority in lockstep.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    max_attempts: u32,
    base_delay: Duration,
    factor: f64,
    max_delay: Duration,
}

impl Default for ExponentialBackoff {
    /// Default backoff configuration
    ///
    /// Three attempts, starting from 100 ms with a factor of 2, capped at
    /// 15 seconds.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            factor: 2.0,
            max_delay: Duration::from_secs(15),
        }
    }
}

impl ExponentialBackoff {
    /// Constructs a backoff policy
    pub fn new(max_attempts: u32, base_delay: Duration, factor: f64, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            factor,
            max_delay,
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_before_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }

        let exponent = (attempt - 1).min(63);
        let scaled = self.base_delay.mul_f64(self.factor.powi(exponent as i32));
        let capped = scaled.min(self.max_delay);
        capped.mul_f64(rand::thread_rng().gen_range(0.5..=1.0))
    }
}
