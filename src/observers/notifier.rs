//! # Notifier: in-line fan-out to observers.
//!
//! [`Notifier`] delivers snapshots to every registered [`Observe`] implementation
//! synchronously, in registration order, and owns the one-shot completion latch.
//!
//! ```text
//! SpotPool::try_acquire/release ──► spot_changed(&SpotChange) ──► obs.on_spot_changed()
//! vehicle/exit task             ──► status(&Status) ──► obs.on_status()
//!                                         └─ first completed ──► obs.on_completed()
//!                                                              Bus ◄─ SimulationCompleted
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::events::{Bus, Event, EventKind};
use crate::model::{SpotChange, Status};

use super::Observe;

struct Inner {
    observers: Vec<Arc<dyn Observe>>,
    bus: Bus,
    completed: AtomicBool,
}

/// Cloneable handle that fans snapshots out to observers.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

impl Notifier {
    /// Creates a notifier over the given observers, publishing completion to `bus`.
    pub fn new(observers: Vec<Arc<dyn Observe>>, bus: Bus) -> Self {
        Self {
            inner: Arc::new(Inner {
                observers,
                bus,
                completed: AtomicBool::new(false),
            }),
        }
    }

    /// A notifier with no observers and a private bus.
    pub fn detached() -> Self {
        Self::new(Vec::new(), Bus::new(1))
    }

    /// Delivers a spot change.
    pub fn spot_changed(&self, change: &SpotChange) {
        self.each("on_spot_changed", |obs| obs.on_spot_changed(change));
    }

    /// Delivers a status snapshot; fires completion the first time `status.completed` is seen.
    ///
    /// Returns `true` if this call fired the completion notification.
    pub fn status(&self, status: &Status) -> bool {
        self.each("on_status", |obs| obs.on_status(status));

        if !status.completed || self.inner.completed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.each("on_completed", |obs| obs.on_completed(status));
        self.inner
            .bus
            .publish(Event::new(EventKind::SimulationCompleted).with_count(status.processed));
        true
    }

    /// True once completion has fired.
    pub fn is_completed(&self) -> bool {
        self.inner.completed.load(Ordering::Acquire)
    }

    fn each(&self, hook: &'static str, f: impl Fn(&dyn Observe)) {
        for obs in &self.inner.observers {
            if catch_unwind(AssertUnwindSafe(|| f(obs.as_ref()))).is_err() {
                warn!(observer = obs.name(), hook, "observer panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counting {
        statuses: AtomicUsize,
        completions: AtomicUsize,
    }

    impl Observe for Counting {
        fn on_status(&self, _: &Status) {
            self.statuses.fetch_add(1, Ordering::SeqCst);
        }
        fn on_completed(&self, _: &Status) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Panicky;

    impl Observe for Panicky {
        fn on_status(&self, _: &Status) {
            panic!("boom");
        }
    }

    fn status(completed: bool) -> Status {
        Status {
            capacity: 1,
            occupied: 0,
            available: 1,
            waiting: 0,
            direction: Direction::None,
            entered: 1,
            processed: 1,
            rejected: 0,
            active: 0,
            quota: 1,
            completed,
        }
    }

    #[test]
    fn completion_fires_once() {
        let counting = Arc::new(Counting::default());
        let notifier = Notifier::new(vec![counting.clone() as Arc<dyn Observe>], Bus::new(8));

        assert!(!notifier.status(&status(false)));
        assert!(notifier.status(&status(true)));
        assert!(!notifier.status(&status(true)));

        assert!(notifier.is_completed());
        assert_eq!(counting.statuses.load(Ordering::SeqCst), 3);
        assert_eq!(counting.completions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_observer_does_not_starve_others() {
        let counting = Arc::new(Counting::default());
        let observers: Vec<Arc<dyn Observe>> = vec![Arc::new(Panicky), counting.clone()];
        let notifier = Notifier::new(observers, Bus::new(8));

        notifier.status(&status(false));
        assert_eq!(counting.statuses.load(Ordering::SeqCst), 1);
    }
}
