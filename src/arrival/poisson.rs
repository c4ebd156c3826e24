//! # Poisson arrival process.
//!
//! [`ArrivalProcess`] draws exponential inter-arrival gaps with rate λ
//! (arrivals per second) by inverse transform sampling:
//!
//! ```text
//! u  ~ Uniform(0, 1]
//! Δt = -ln(u) / λ        (mean 1/λ)
//! ```
//!
//! Draws are not clamped here; the simulation bounds them with
//! [`Config::clamp_arrival`](crate::Config::clamp_arrival).

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;

/// Exponential inter-arrival generator (cheap to share behind `&`).
#[derive(Debug)]
pub struct ArrivalProcess {
    rate: f64,
    rng: Mutex<StdRng>,
}

impl ArrivalProcess {
    /// Creates a process seeded from the OS.
    ///
    /// Fails with [`ConfigError::InvalidArrivalRate`] unless `rate` is finite and positive.
    pub fn new(rate: f64) -> Result<Self, ConfigError> {
        Self::with_rng(rate, StdRng::from_os_rng())
    }

    /// Creates a reproducible process.
    pub fn seeded(rate: f64, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rate: f64, rng: StdRng) -> Result<Self, ConfigError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::InvalidArrivalRate { rate });
        }
        Ok(Self {
            rate,
            rng: Mutex::new(rng),
        })
    }

    /// Draws the next inter-arrival gap.
    pub fn next_interval(&self) -> Duration {
        let sample: f64 = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random();
        // random() is in [0, 1); flip it so ln never sees 0.
        let u = 1.0 - sample;
        Duration::try_from_secs_f64(-u.ln() / self.rate).unwrap_or(Duration::MAX)
    }

    /// Arrivals per second.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Expected gap, `1/λ`; saturates at `Duration::MAX` for vanishing rates.
    pub fn mean(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.rate).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_mean_tracks_rate() {
        let process = ArrivalProcess::seeded(3.0, 7).unwrap();
        let draws = 100_000;
        let total: f64 = (0..draws)
            .map(|_| process.next_interval().as_secs_f64())
            .sum();
        let mean = total / f64::from(draws);
        let expected = process.mean().as_secs_f64();
        assert!(
            (mean - expected).abs() / expected < 0.03,
            "mean {mean} vs expected {expected}"
        );
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = ArrivalProcess::seeded(2.0, 42).unwrap();
        let b = ArrivalProcess::seeded(2.0, 42).unwrap();
        for _ in 0..32 {
            assert_eq!(a.next_interval(), b.next_interval());
        }
    }

    #[test]
    fn rejects_bad_rates() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ArrivalProcess::new(rate),
                Err(ConfigError::InvalidArrivalRate { .. })
            ));
        }
    }

    #[test]
    fn tiny_rate_saturates() {
        let process = ArrivalProcess::seeded(1e-20, 3).unwrap();
        assert_eq!(process.mean(), Duration::MAX);

        let subnormal = ArrivalProcess::seeded(f64::MIN_POSITIVE, 3).unwrap();
        assert_eq!(subnormal.mean(), Duration::MAX);
    }
}
