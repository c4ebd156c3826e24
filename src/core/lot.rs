//! Shared state of one running simulation.
//!
//! [`Lot`] bundles the two lock domains (pool table, gate state) with the
//! notification and control plumbing. Occupancy and the vehicle tally live in
//! the pool table, so a status snapshot takes them from one critical section
//! and only the lane direction is read separately.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;

use crate::arrival::ArrivalProcess;
use crate::config::{Config, DurationRange};
use crate::events::{Bus, Event};
use crate::gate::{DirectionGate, EntryPass};
use crate::model::{Status, VehicleId};
use crate::observers::Notifier;
use crate::pool::SpotPool;

use super::RunFlag;

/// Why an entry attempt was turned away.
///
/// Refusals are expected contention, fed to the retry loop; they are not errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryRefusal {
    /// The lane is in an exit burst.
    GateClosed,
    /// No free spot.
    LotFull,
}

impl EntryRefusal {
    pub fn as_label(self) -> &'static str {
        match self {
            EntryRefusal::GateClosed => "gate_closed",
            EntryRefusal::LotFull => "lot_full",
        }
    }
}

impl fmt::Display for EntryRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

pub(crate) struct Lot {
    pub(crate) cfg: Config,
    pub(crate) pool: SpotPool,
    pub(crate) gate: DirectionGate,
    pub(crate) arrivals: ArrivalProcess,
    pub(crate) notifier: Notifier,
    pub(crate) bus: Bus,
    pub(crate) run: RunFlag,
    pub(crate) token: CancellationToken,
    rng: Mutex<StdRng>,
}

impl Lot {
    pub(crate) fn new(
        cfg: Config,
        arrivals: ArrivalProcess,
        rng: StdRng,
        notifier: Notifier,
        bus: Bus,
    ) -> Self {
        Self {
            pool: SpotPool::new(cfg.capacity, notifier.clone()),
            gate: DirectionGate::new(cfg.gate_poll),
            arrivals,
            notifier,
            bus,
            run: RunFlag::new(false),
            token: CancellationToken::new(),
            rng: Mutex::new(rng),
            cfg,
        }
    }

    /// Gate check followed by a spot acquisition; the pass is held only on success.
    pub(crate) fn try_enter(&self, vehicle: VehicleId) -> Result<(usize, EntryPass<'_>), EntryRefusal> {
        let pass = self.gate.enter().ok_or(EntryRefusal::GateClosed)?;
        let spot = self
            .pool
            .try_acquire(vehicle)
            .ok_or(EntryRefusal::LotFull)?;
        Ok((spot, pass))
    }

    pub(crate) fn status(&self) -> Status {
        let pool = self.pool.snapshot();
        let tally = pool.tally;
        let active = tally.active();
        let quota = self.cfg.quota;

        Status {
            capacity: pool.capacity,
            occupied: pool.occupied,
            available: pool.available,
            waiting: tally.waiting,
            direction: self.gate.direction(),
            entered: pool.entered,
            processed: tally.processed,
            rejected: tally.rejected,
            active,
            quota,
            completed: tally.processed >= quota && active == 0,
        }
    }

    /// Sends a fresh snapshot to observers (fires completion at most once).
    pub(crate) fn publish_status(&self) {
        self.notifier.status(&self.status());
    }

    pub(crate) fn publish(&self, ev: Event) {
        self.bus.publish(ev);
    }

    pub(crate) fn sample(&self, range: &DurationRange) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        range.sample(&mut *rng)
    }

    pub(crate) fn active(&self) -> u64 {
        self.pool.snapshot().tally.active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;
    use rand::SeedableRng;

    fn lot(capacity: usize, quota: u64) -> Lot {
        let cfg = Config {
            capacity,
            quota,
            ..Config::default()
        };
        let arrivals = ArrivalProcess::seeded(cfg.arrival_rate, 1).unwrap();
        Lot::new(
            cfg,
            arrivals,
            StdRng::seed_from_u64(2),
            Notifier::detached(),
            Bus::new(8),
        )
    }

    #[test]
    fn refusal_reasons() {
        let lot = lot(1, 1);

        let exit = lot.gate.try_exit_begin();
        assert!(exit);
        assert_eq!(lot.try_enter(1).err(), Some(EntryRefusal::GateClosed));
        lot.gate.exit_end();

        let (spot, pass) = lot.try_enter(1).unwrap();
        assert_eq!(spot, 0);
        assert_eq!(lot.status().direction, Direction::Entry);
        drop(pass);

        assert_eq!(lot.try_enter(2).err(), Some(EntryRefusal::LotFull));
        assert_eq!(lot.status().direction, Direction::None);
    }

    #[test]
    fn completion_needs_quota_and_no_active() {
        let lot = lot(2, 2);
        lot.pool.record_arrived();
        lot.pool.record_arrived();
        lot.pool.record_rejected();
        assert!(!lot.status().completed);

        let spot = lot.pool.try_acquire(2).unwrap();
        let s = lot.status();
        assert_eq!((s.waiting, s.active, s.processed), (0, 1, 1));
        assert_eq!(s.occupied, 1);

        assert!(lot.pool.release(spot, 2));
        assert!(!lot.status().completed);

        lot.pool.record_left();
        let s = lot.status();
        assert!(s.completed);
        assert_eq!((s.occupied, s.rejected), (0, 1));
    }

    #[test]
    fn abandoned_is_not_processed() {
        let lot = lot(1, 1);
        lot.pool.record_arrived();
        lot.pool.record_abandoned();
        let s = lot.status();
        assert_eq!((s.active, s.processed), (0, 0));
        assert!(!s.completed);
    }
}
