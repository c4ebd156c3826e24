//! Error types used by the lotvisor runtime.
//!
//! This module defines two error enums:
//!
//! - [`ConfigError`]: a [`Config`](crate::Config) that cannot drive a simulation.
//! - [`RuntimeError`]: failures of the orchestration runtime itself.
//!
//! Contention (gate closed, lot full) is **not** an error: it is reported as an
//! [`EntryRefusal`](crate::EntryRefusal) value and retried. Both enums provide
//! `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Invalid simulation configuration.
///
/// Returned by [`Config::validate`](crate::Config::validate) and
/// [`SimulationBuilder::build`](crate::SimulationBuilder::build); a simulation is
/// never constructed from a configuration that produced one of these.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The lot must have at least one spot.
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    /// At least one vehicle must be scheduled.
    #[error("quota must be greater than zero")]
    ZeroQuota,

    /// Arrival rate must be a positive, finite number of arrivals per second.
    #[error("arrival rate must be positive and finite, got {rate}")]
    InvalidArrivalRate {
        /// The rejected rate.
        rate: f64,
    },

    /// A `[min, max]` duration range with `min > max`.
    #[error("{name}: min {min:?} is greater than max {max:?}")]
    InvertedRange {
        /// Name of the configuration field.
        name: &'static str,
        /// Configured lower bound.
        min: Duration,
        /// Configured upper bound.
        max: Duration,
    },

    /// Backoff parameters that cannot produce a delay sequence.
    #[error("invalid backoff: {reason}")]
    InvalidBackoff {
        /// What is wrong with the policy.
        reason: &'static str,
    },

    /// The direction gate poll interval must be non-zero (a zero interval spins).
    #[error("gate poll interval must be greater than zero")]
    ZeroGatePoll,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lotvisor::ConfigError;
    ///
    /// assert_eq!(ConfigError::ZeroCapacity.as_label(), "config_zero_capacity");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroCapacity => "config_zero_capacity",
            ConfigError::ZeroQuota => "config_zero_quota",
            ConfigError::InvalidArrivalRate { .. } => "config_invalid_arrival_rate",
            ConfigError::InvertedRange { .. } => "config_inverted_range",
            ConfigError::InvalidBackoff { .. } => "config_invalid_backoff",
            ConfigError::ZeroGatePoll => "config_zero_gate_poll",
        }
    }
}

/// # Errors produced by the simulation runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// [`Simulation::run`](crate::Simulation::run) was called more than once.
    #[error("simulation already started")]
    AlreadyStarted,

    /// Shutdown grace period was exceeded; some vehicles were still in the lot.
    #[error("shutdown timeout {grace:?} exceeded; {active} vehicles still active")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Vehicles that had not reached a terminal state.
        active: u64,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lotvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), active: 3 };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::AlreadyStarted => "runtime_already_started",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::AlreadyStarted => "run() called on a started simulation".to_string(),
            RuntimeError::GraceExceeded { grace, active } => {
                format!("grace exceeded after {grace:?}; active vehicles={active}")
            }
        }
    }
}
