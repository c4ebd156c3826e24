//! # Simulation configuration.
//!
//! Provides [`Config`], the centralized settings for one simulation run.
//!
//! Config is consumed by [`Simulation::builder`](crate::Simulation::builder), which
//! calls [`Config::validate`] before constructing anything: a simulation never
//! starts from an invalid configuration.
//!
//! ## Defaults
//! The defaults model a 20-spot lot processing 100 vehicles with a shared
//! single-lane entrance:
//! - dwell 3–5s, entry/exit transit 100–200ms
//! - arrivals at λ = 3/s, clamped into a 100–500ms band
//! - 30 entry retries, 100ms apart; gate polled every 100ms

use std::time::Duration;

use rand::Rng;

use crate::error::ConfigError;
use crate::policies::RetryPolicy;

/// Inclusive `[min, max]` duration range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationRange {
    pub min: Duration,
    pub max: Duration,
}

impl DurationRange {
    /// Creates a range; ordering is checked by [`Config::validate`].
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Both bounds equal to `d`.
    pub const fn fixed(d: Duration) -> Self {
        Self { min: d, max: d }
    }

    /// Draws a uniform duration from the range (nanosecond resolution).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let lo = self.min.as_nanos().min(u128::from(u64::MAX)) as u64;
        let hi = self.max.as_nanos().min(u128::from(u64::MAX)) as u64;
        if hi <= lo {
            return self.min;
        }
        Duration::from_nanos(rng.random_range(lo..=hi))
    }

    /// Clamps `d` into the range.
    pub fn clamp(&self, d: Duration) -> Duration {
        d.clamp(self.min, self.max.max(self.min))
    }

    fn check(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Configuration of one simulation run.
///
/// ## Field semantics
/// - `capacity`: number of spots (`> 0`)
/// - `quota`: vehicles spawned before the run can complete (`> 0`)
/// - `dwell`: how long a parked vehicle stays
/// - `entry_transit` / `exit_transit`: time spent in the lane while holding the gate
/// - `arrival_rate`: Poisson rate λ in arrivals per second (`> 0`, finite)
/// - `arrival_clamp`: band every drawn inter-arrival gap is clamped into
/// - `retry`: entry retries and backoff between them
/// - `gate_poll`: delay between exit-gate polls while an entry burst is active (`> 0`)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `grace`: how long shutdown waits for in-flight vehicles
/// - `seed`: fixes the arrival/dwell RNG for reproducible runs
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub capacity: usize,
    pub quota: u64,
    pub dwell: DurationRange,
    pub entry_transit: DurationRange,
    pub exit_transit: DurationRange,
    pub arrival_rate: f64,
    pub arrival_clamp: DurationRange,
    pub retry: RetryPolicy,
    pub gate_poll: Duration,
    pub bus_capacity: usize,
    pub grace: Duration,
    pub seed: Option<u64>,
}

impl Config {
    /// Checks every constraint; returns the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.quota == 0 {
            return Err(ConfigError::ZeroQuota);
        }
        if !self.arrival_rate.is_finite() || self.arrival_rate <= 0.0 {
            return Err(ConfigError::InvalidArrivalRate {
                rate: self.arrival_rate,
            });
        }
        self.dwell.check("dwell")?;
        self.entry_transit.check("entry_transit")?;
        self.exit_transit.check("exit_transit")?;
        self.arrival_clamp.check("arrival_clamp")?;
        self.retry.backoff.validate()?;
        if self.gate_poll.is_zero() {
            return Err(ConfigError::ZeroGatePoll);
        }
        Ok(())
    }

    /// Clamps a drawn inter-arrival gap into [`Config::arrival_clamp`].
    #[inline]
    pub fn clamp_arrival(&self, d: Duration) -> Duration {
        self.arrival_clamp.clamp(d)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 20,
            quota: 100,
            dwell: DurationRange::new(Duration::from_secs(3), Duration::from_secs(5)),
            entry_transit: DurationRange::new(Duration::from_millis(100), Duration::from_millis(200)),
            exit_transit: DurationRange::new(Duration::from_millis(100), Duration::from_millis(200)),
            arrival_rate: 3.0,
            arrival_clamp: DurationRange::new(Duration::from_millis(100), Duration::from_millis(500)),
            retry: RetryPolicy::default(),
            gate_poll: Duration::from_millis(100),
            bus_capacity: 1024,
            grace: Duration::from_secs(10),
            seed: None,
        }
    }
}
