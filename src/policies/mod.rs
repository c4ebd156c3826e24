//! Entry retry policies.
//!
//! This module groups the knobs that control **how often** a refused vehicle
//! tries again and **how long** it waits between attempts.
//!
//! ## Contents
//! - [`RetryPolicy`] bounded number of retries + backoff
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization strategy to avoid synchronized retries
//! - [`retry_with_backoff`] the combinator that drives attempts to a [`RetryOutcome`]
//!
//! ## Defaults
//! - `RetryPolicy::default()` → 30 retries.
//! - `BackoffPolicy::default()` → first=100ms, factor=1.0 (constant), max=1s, jitter=None.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::{RetryOutcome, RetryPolicy, retry_with_backoff};
