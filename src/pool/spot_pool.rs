//! # SpotPool: bounded spot allocator.
//!
//! One lock guards the whole table: the slot array, the ordered free-index set,
//! the occupant map and the vehicle [`Tally`]. "Available" is the size of the
//! free set, so the counter and the table cannot drift apart and
//! `occupied + available == capacity` holds by construction. A
//! [`PoolSnapshot`] is read in a single critical section, so occupancy and the
//! tally always describe the same moment.
//!
//! ```text
//! try_acquire(id) ── lock ──► free.pop_first() ─┬─ Some(i) → spots[i].occupant = id
//!                                               │             occupants[id] = i, waiting -= 1
//!                                               │             Notifier::spot_changed
//!                                               └─ None    → lot full
//!
//! release(i, id)  ── lock ──► spots[i].occupant == id ? ─┬─ yes → clear, free.insert(i)
//!                                                        │        Notifier::spot_changed
//!                                                        └─ no  → no-op (stale/duplicate)
//! ```
//!
//! Spot-changed callbacks run while the lock is held, so observers see changes
//! in the order they were applied. Observers must not call back into the pool.
//!
//! Acquisition never waits: contention is reported as `None` and the caller retries.
//! Spots are handed out lowest-index-first, which is **not** first-come-first-served.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::model::{Spot, VehicleId};
use crate::observers::Notifier;

/// Vehicle lifecycle counts, kept in the pool table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub arrived: u64,
    /// Arrived and still attempting entry.
    pub waiting: u64,
    /// Left or rejected permanently.
    pub processed: u64,
    pub rejected: u64,
    /// Gave up retrying because of shutdown.
    pub abandoned: u64,
}

impl Tally {
    /// Arrived and not yet in a terminal state.
    pub fn active(&self) -> u64 {
        self.arrived
            .saturating_sub(self.processed)
            .saturating_sub(self.abandoned)
    }
}

/// Counters read in one critical section of the pool lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub capacity: usize,
    pub occupied: usize,
    pub available: usize,
    /// Successful acquisitions since construction.
    pub entered: u64,
    /// Successful releases since construction.
    pub released: u64,
    pub tally: Tally,
}

struct Table {
    spots: Vec<Spot>,
    free: BTreeSet<usize>,
    occupants: HashMap<VehicleId, usize>,
    entered: u64,
    released: u64,
    tally: Tally,
}

/// Fixed-capacity spot table shared by all vehicle tasks.
pub struct SpotPool {
    table: Mutex<Table>,
    capacity: usize,
    notifier: Notifier,
}

impl SpotPool {
    /// Creates a pool of `capacity` free spots (indices `0..capacity`).
    pub fn new(capacity: usize, notifier: Notifier) -> Self {
        Self {
            table: Mutex::new(Table {
                spots: (0..capacity).map(Spot::new).collect(),
                free: (0..capacity).collect(),
                occupants: HashMap::with_capacity(capacity),
                entered: 0,
                released: 0,
                tally: Tally::default(),
            }),
            capacity,
            notifier,
        }
    }

    /// Takes the lowest free spot for `vehicle`, without waiting.
    ///
    /// Returns `None` when the lot is full, or when `vehicle` already holds a spot.
    /// On success the vehicle stops counting as waiting.
    pub fn try_acquire(&self, vehicle: VehicleId) -> Option<usize> {
        let mut table = self.lock();
        if let Some(&held) = table.occupants.get(&vehicle) {
            warn!(vehicle, spot = held, "vehicle already holds a spot; acquire refused");
            return None;
        }
        let index = table.free.pop_first()?;
        let spot = &mut table.spots[index];
        spot.occupant = Some(vehicle);
        let change = spot.change();
        table.occupants.insert(vehicle, index);
        table.entered += 1;
        table.tally.waiting = table.tally.waiting.saturating_sub(1);

        debug!(vehicle, spot = index, "spot acquired");
        self.notifier.spot_changed(&change);
        Some(index)
    }

    /// Frees `index` if it is held by `vehicle`.
    ///
    /// A mismatched occupant, an already free spot or an out-of-range index is a
    /// no-op: nothing changes and `false` is returned. Releasing twice therefore
    /// mutates state only once.
    pub fn release(&self, index: usize, vehicle: VehicleId) -> bool {
        let mut table = self.lock();
        let Some(spot) = table.spots.get_mut(index) else {
            warn!(vehicle, spot = index, "release of unknown spot ignored");
            return false;
        };
        if spot.occupant != Some(vehicle) {
            warn!(
                vehicle,
                spot = index,
                occupant = ?spot.occupant,
                "release by non-occupant ignored"
            );
            return false;
        }
        spot.occupant = None;
        let change = spot.change();
        table.free.insert(index);
        table.occupants.remove(&vehicle);
        table.released += 1;

        debug!(vehicle, spot = index, "spot released");
        self.notifier.spot_changed(&change);
        true
    }

    /// Counts a new arrival as waiting.
    pub fn record_arrived(&self) {
        let mut table = self.lock();
        table.tally.arrived += 1;
        table.tally.waiting += 1;
    }

    /// Counts a waiting vehicle that exhausted its retries as processed.
    pub fn record_rejected(&self) {
        let mut table = self.lock();
        let tally = &mut table.tally;
        tally.waiting = tally.waiting.saturating_sub(1);
        tally.processed += 1;
        tally.rejected += 1;
    }

    /// Counts a waiting vehicle that stopped because of shutdown.
    pub fn record_abandoned(&self) {
        let mut table = self.lock();
        let tally = &mut table.tally;
        tally.waiting = tally.waiting.saturating_sub(1);
        tally.abandoned += 1;
    }

    /// Counts a departed vehicle as processed.
    pub fn record_left(&self) {
        self.lock().tally.processed += 1;
    }

    /// Occupancy and tally from one critical section.
    pub fn snapshot(&self) -> PoolSnapshot {
        let table = self.lock();
        let available = table.free.len();
        PoolSnapshot {
            capacity: self.capacity,
            occupied: self.capacity - available,
            available,
            entered: table.entered,
            released: table.released,
            tally: table.tally,
        }
    }

    /// Copy of the slot table.
    pub fn spots(&self) -> Vec<Spot> {
        self.lock().spots.clone()
    }

    /// Spot currently held by `vehicle`.
    pub fn spot_of(&self, vehicle: VehicleId) -> Option<usize> {
        self.lock().occupants.get(&vehicle).copied()
    }

    /// Number of free spots.
    pub fn available(&self) -> usize {
        self.lock().free.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Observer panics are caught by the notifier and the table is valid after
    // every statement, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Bus;
    use crate::model::SpotChange;
    use crate::observers::Observe;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn pool(capacity: usize) -> SpotPool {
        SpotPool::new(capacity, Notifier::detached())
    }

    #[derive(Default)]
    struct Changes(Mutex<Vec<SpotChange>>);

    impl Observe for Changes {
        fn on_spot_changed(&self, change: &SpotChange) {
            self.0.lock().unwrap().push(*change);
        }
    }

    fn assert_balanced(pool: &SpotPool) {
        let snap = pool.snapshot();
        assert_eq!(snap.occupied + snap.available, snap.capacity);
        let occupied = pool.spots().iter().filter(|s| s.is_occupied()).count();
        assert_eq!(occupied, snap.occupied);
    }

    #[test]
    fn hands_out_lowest_free_index() {
        let pool = pool(3);
        assert_eq!(pool.try_acquire(10), Some(0));
        assert_eq!(pool.try_acquire(11), Some(1));
        assert_eq!(pool.try_acquire(12), Some(2));
        assert_eq!(pool.try_acquire(13), None);

        assert!(pool.release(1, 11));
        assert_eq!(pool.try_acquire(13), Some(1));
        assert_balanced(&pool);
    }

    #[test]
    fn double_release_mutates_once() {
        let pool = pool(2);
        let spot = pool.try_acquire(1).unwrap();

        assert!(pool.release(spot, 1));
        let after_first = pool.snapshot();
        assert!(!pool.release(spot, 1));
        assert_eq!(pool.snapshot(), after_first);
        assert_eq!(after_first.released, 1);
        assert_balanced(&pool);
    }

    #[test]
    fn release_by_wrong_vehicle_is_ignored() {
        let pool = pool(2);
        let spot = pool.try_acquire(1).unwrap();

        assert!(!pool.release(spot, 2));
        assert!(!pool.release(99, 1));
        assert_eq!(pool.spot_of(1), Some(spot));
        assert_eq!(pool.spots()[spot].occupant, Some(1));
    }

    #[test]
    fn vehicle_cannot_hold_two_spots() {
        let pool = pool(2);
        assert_eq!(pool.try_acquire(5), Some(0));
        assert_eq!(pool.try_acquire(5), None);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn concurrent_acquires_never_share_a_spot() {
        let pool = Arc::new(pool(16));
        let handles: Vec<_> = (0..64u64)
            .map(|id| {
                let pool = pool.clone();
                thread::spawn(move || pool.try_acquire(id).map(|spot| (id, spot)))
            })
            .collect();

        let won: Vec<(u64, usize)> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(won.len(), 16);
        let spots: HashSet<usize> = won.iter().map(|&(_, s)| s).collect();
        assert_eq!(spots.len(), 16);
        assert_balanced(&pool);

        for (id, spot) in won {
            assert!(pool.release(spot, id));
        }
        assert_eq!(pool.available(), 16);
    }

    #[test]
    fn churn_keeps_invariant() {
        let pool = Arc::new(pool(4));
        let handles: Vec<_> = (0..8u64)
            .map(|worker| {
                let pool = pool.clone();
                thread::spawn(move || {
                    for round in 0..500u64 {
                        let id = worker * 1_000 + round;
                        if let Some(spot) = pool.try_acquire(id) {
                            let snap = pool.snapshot();
                            assert_eq!(snap.occupied + snap.available, snap.capacity);
                            assert!(pool.release(spot, id));
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snap = pool.snapshot();
        assert_eq!(snap.occupied, 0);
        assert_eq!(snap.entered, snap.released);
    }

    #[test]
    fn spot_changes_arrive_in_applied_order() {
        let changes = Arc::new(Changes::default());
        let observers: Vec<Arc<dyn Observe>> = vec![changes.clone()];
        let pool = Arc::new(SpotPool::new(1, Notifier::new(observers, Bus::new(1))));

        let handles: Vec<_> = (0..4u64)
            .map(|worker| {
                let pool = pool.clone();
                thread::spawn(move || {
                    let mut cycles = 0;
                    let mut id = worker * 1_000_000;
                    while cycles < 5_000 {
                        id += 1;
                        if let Some(spot) = pool.try_acquire(id) {
                            assert!(pool.release(spot, id));
                            cycles += 1;
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let changes = changes.0.lock().unwrap();
        assert_eq!(changes.len(), 2 * 4 * 5_000);
        for pair in changes.chunks(2) {
            let (taken, freed) = (pair[0], pair[1]);
            assert!(taken.occupied, "expected a take, got {taken:?}");
            assert!(!freed.occupied, "expected a release, got {freed:?}");
            assert_ne!(taken.occupant, None);
        }
        let snap = pool.snapshot();
        assert_eq!((snap.entered, snap.released), (20_000, 20_000));
    }

    #[test]
    fn tally_moves_with_acquire() {
        let pool = pool(1);
        pool.record_arrived();
        pool.record_arrived();
        assert_eq!(pool.snapshot().tally.waiting, 2);

        let spot = pool.try_acquire(1).unwrap();
        let snap = pool.snapshot();
        assert_eq!((snap.occupied, snap.tally.waiting, snap.tally.active()), (1, 1, 2));

        pool.record_rejected();
        assert!(pool.release(spot, 1));
        pool.record_left();
        let tally = pool.snapshot().tally;
        assert_eq!(tally.waiting, 0);
        assert_eq!((tally.processed, tally.rejected, tally.active()), (2, 1, 0));
    }
}
