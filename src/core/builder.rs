use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::arrival::ArrivalProcess;
use crate::config::Config;
use crate::error::ConfigError;
use crate::events::Bus;
use crate::observers::{Notifier, Observe};
use crate::subscribers::Subscribe;

use super::lot::Lot;
use super::simulation::Simulation;

/// Builder for constructing a [`Simulation`] with optional observers and subscribers.
pub struct SimulationBuilder {
    cfg: Config,
    observers: Vec<Arc<dyn Observe>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SimulationBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            observers: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Sets synchronous observers, called in-line with every snapshot.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with
    /// bounded queues, started by [`Simulation::run`].
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Fixes the random seed for arrivals, dwell and transit sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.cfg.seed = Some(seed);
        self
    }

    /// Validates the configuration and assembles the simulation.
    ///
    /// Does not spawn anything; no runtime is needed until [`Simulation::run`].
    pub fn build(self) -> Result<Simulation, ConfigError> {
        self.cfg.validate()?;

        let (arrivals, rng) = match self.cfg.seed {
            Some(seed) => (
                ArrivalProcess::seeded(self.cfg.arrival_rate, seed)?,
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (
                ArrivalProcess::new(self.cfg.arrival_rate)?,
                StdRng::from_os_rng(),
            ),
        };

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let notifier = Notifier::new(self.observers, bus.clone());
        let lot = Lot::new(self.cfg, arrivals, rng, notifier, bus);

        Ok(Simulation::new_internal(lot, self.subscribers))
    }
}
