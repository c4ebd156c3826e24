//! # Backoff policy between entry attempts.
//!
//! [`BackoffPolicy`] controls how long a refused vehicle waits before its next
//! entry attempt. It is parameterized by:
//! - [`BackoffPolicy::first`] the delay after the first refusal;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! The delay for retry `n` (0-indexed) is `first × factor^n`, clamped to `max`,
//! then jitter is applied. The base is derived from `n` alone, so jitter never
//! feeds back into later delays.
//!
//! The lot's default is a constant 100ms (`factor = 1.0`).
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use lotvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//! // 100ms × 2^10 → capped at max
//! assert_eq!(backoff.next(10), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap for retries.
    pub max: Duration,
    /// Multiplicative growth factor (`1.0` = constant delay).
    pub factor: f64,
    /// Jitter applied on top of the computed delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a constant policy:
    /// - `first = 100ms`;
    /// - `factor = 1.0`;
    /// - `max = 1s`;
    /// - no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(1),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Constant delay, no jitter.
    #[inline]
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay for the given retry number (0-indexed).
    ///
    /// # Notes
    /// - `factor == 1.0` keeps the delay at `first` (up to `max`).
    /// - `factor > 1.0` grows exponentially up to `max`.
    /// - Non-finite intermediate values clamp to `max`.
    pub fn next(&self, retry: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = retry.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base =
            if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
                self.max
            } else {
                Duration::from_secs_f64(unclamped_secs)
            };

        self.jitter.apply(base)
    }

    /// Checks that the policy produces a usable delay sequence.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(ConfigError::InvalidBackoff {
                reason: "factor must be positive and finite",
            });
        }
        if self.first > self.max {
            return Err(ConfigError::InvalidBackoff {
                reason: "first delay exceeds max",
            });
        }
        Ok(())
    }
}
