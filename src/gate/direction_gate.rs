//! # DirectionGate: one-lane, one-direction-at-a-time gate.
//!
//! The gate admits a burst of crossings in one direction. Any number of
//! vehicles may cross together in the current direction; the opposite
//! direction is admitted only after the burst drains back to [`GateState::Idle`].
//!
//! ```text
//!             enter_begin()            exit_begin()
//!   Idle ───────────────► EntryBurst(1)   Idle ───────────────► ExitBurst(1)
//!    ▲                      │  ▲ enter_begin()   ▲                 │  ▲ exit_begin()
//!    │                      ▼  │                  │                 ▼  │
//!    └──── enter_end() ── EntryBurst(n)           └── exit_end() ── ExitBurst(n)
//!          (n reaches 0)                               (n reaches 0)
//! ```
//!
//! Entry is non-blocking: in an exit burst it is refused and the vehicle backs off.
//! Exit polls: in an entry burst it sleeps `poll` and retries, without bound,
//! until the burst drains.
//!
//! Entry bursts can keep exits waiting indefinitely under sustained arrivals;
//! there is no fairness between directions.
//!
//! Prefer the RAII passes [`DirectionGate::enter`] and [`DirectionGate::exit`]:
//! ending a burst happens when the pass is dropped, even on an early return.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time;
use tracing::warn;

use crate::model::Direction;

/// Gate occupancy: idle, or a burst with the number of vehicles still crossing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Idle,
    EntryBurst(usize),
    ExitBurst(usize),
}

impl GateState {
    /// Direction currently admitted.
    pub fn direction(self) -> Direction {
        match self {
            GateState::Idle => Direction::None,
            GateState::EntryBurst(_) => Direction::Entry,
            GateState::ExitBurst(_) => Direction::Exit,
        }
    }

    /// Vehicles currently crossing.
    pub fn crossing(self) -> usize {
        match self {
            GateState::Idle => 0,
            GateState::EntryBurst(n) | GateState::ExitBurst(n) => n,
        }
    }
}

/// Direction arbiter for the single lane.
#[derive(Debug)]
pub struct DirectionGate {
    state: Mutex<GateState>,
    poll: Duration,
}

impl DirectionGate {
    /// Creates an idle gate; exits re-check every `poll` while blocked.
    pub fn new(poll: Duration) -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
            poll,
        }
    }

    /// Starts an entry crossing if the gate is not in an exit burst.
    pub fn enter_begin(&self) -> bool {
        let mut state = self.lock();
        match *state {
            GateState::Idle => {
                *state = GateState::EntryBurst(1);
                true
            }
            GateState::EntryBurst(n) => {
                *state = GateState::EntryBurst(n + 1);
                true
            }
            GateState::ExitBurst(_) => false,
        }
    }

    /// Ends an entry crossing.
    pub fn enter_end(&self) {
        let mut state = self.lock();
        match *state {
            GateState::EntryBurst(1) => *state = GateState::Idle,
            GateState::EntryBurst(n) => *state = GateState::EntryBurst(n - 1),
            other => warn!(state = ?other, "enter_end without a matching enter_begin"),
        }
    }

    /// Starts an exit crossing if the gate is not in an entry burst.
    pub fn try_exit_begin(&self) -> bool {
        let mut state = self.lock();
        match *state {
            GateState::Idle => {
                *state = GateState::ExitBurst(1);
                true
            }
            GateState::ExitBurst(n) => {
                *state = GateState::ExitBurst(n + 1);
                true
            }
            GateState::EntryBurst(_) => false,
        }
    }

    /// Starts an exit crossing, sleeping `poll` between checks while entries are crossing.
    pub async fn exit_begin(&self) {
        while !self.try_exit_begin() {
            time::sleep(self.poll).await;
        }
    }

    /// Ends an exit crossing.
    pub fn exit_end(&self) {
        let mut state = self.lock();
        match *state {
            GateState::ExitBurst(1) => *state = GateState::Idle,
            GateState::ExitBurst(n) => *state = GateState::ExitBurst(n - 1),
            other => warn!(state = ?other, "exit_end without a matching exit_begin"),
        }
    }

    /// Non-blocking entry returning a pass that ends the crossing on drop.
    pub fn enter(&self) -> Option<EntryPass<'_>> {
        self.enter_begin().then_some(EntryPass { gate: self })
    }

    /// Waits for the exit direction and returns a pass that ends the crossing on drop.
    pub async fn exit(&self) -> ExitPass<'_> {
        self.exit_begin().await;
        ExitPass { gate: self }
    }

    /// Current gate state.
    pub fn state(&self) -> GateState {
        *self.lock()
    }

    /// Direction currently admitted.
    pub fn direction(&self) -> Direction {
        self.state().direction()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An entry crossing in progress.
#[must_use = "dropping the pass ends the crossing immediately"]
#[derive(Debug)]
pub struct EntryPass<'a> {
    gate: &'a DirectionGate,
}

impl Drop for EntryPass<'_> {
    fn drop(&mut self) {
        self.gate.enter_end();
    }
}

/// An exit crossing in progress.
#[must_use = "dropping the pass ends the crossing immediately"]
#[derive(Debug)]
pub struct ExitPass<'a> {
    gate: &'a DirectionGate,
}

impl Drop for ExitPass<'_> {
    fn drop(&mut self) {
        self.gate.exit_end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    const POLL: Duration = Duration::from_millis(100);

    #[test]
    fn entries_share_a_burst() {
        let gate = DirectionGate::new(POLL);
        assert!(gate.enter_begin());
        assert!(gate.enter_begin());
        assert_eq!(gate.state(), GateState::EntryBurst(2));
        assert!(!gate.try_exit_begin());

        gate.enter_end();
        assert_eq!(gate.state(), GateState::EntryBurst(1));
        gate.enter_end();
        assert_eq!(gate.state(), GateState::Idle);
        assert!(gate.try_exit_begin());
    }

    #[test]
    fn exit_burst_refuses_entry() {
        let gate = DirectionGate::new(POLL);
        assert!(gate.try_exit_begin());
        assert!(!gate.enter_begin());
        assert_eq!(gate.direction(), Direction::Exit);
        gate.exit_end();
        assert!(gate.enter_begin());
    }

    #[test]
    fn unbalanced_end_leaves_state_untouched() {
        let gate = DirectionGate::new(POLL);
        gate.enter_end();
        gate.exit_end();
        assert_eq!(gate.state(), GateState::Idle);

        assert!(gate.try_exit_begin());
        gate.enter_end();
        assert_eq!(gate.state(), GateState::ExitBurst(1));
    }

    #[test]
    fn passes_end_on_drop() {
        let gate = DirectionGate::new(POLL);
        {
            let _a = gate.enter().unwrap();
            let _b = gate.enter().unwrap();
            assert_eq!(gate.state().crossing(), 2);
        }
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn exit_waits_for_entry_burst_to_drain() {
        let gate = Arc::new(DirectionGate::new(POLL));
        let pass = gate.enter().unwrap();

        let exited = Arc::new(AtomicBool::new(false));
        let waiter = {
            let gate = gate.clone();
            let exited = exited.clone();
            tokio::spawn(async move {
                let _pass = gate.exit().await;
                exited.store(true, Ordering::SeqCst);
                assert_eq!(gate.direction(), Direction::Exit);
            })
        };

        time::sleep(POLL * 5).await;
        assert!(!exited.load(Ordering::SeqCst));

        drop(pass);
        waiter.await.unwrap();
        assert!(exited.load(Ordering::SeqCst));
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn directions_never_overlap() {
        let gate = Arc::new(DirectionGate::new(Duration::from_millis(5)));
        let mut tasks = Vec::new();

        for i in 0..40u64 {
            let gate = gate.clone();
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    loop {
                        if let Some(_pass) = gate.enter() {
                            assert_eq!(gate.direction(), Direction::Entry);
                            time::sleep(Duration::from_millis(3 + i % 7)).await;
                            break;
                        }
                        time::sleep(Duration::from_millis(2)).await;
                    }
                } else {
                    let _pass = gate.exit().await;
                    assert_eq!(gate.direction(), Direction::Exit);
                    time::sleep(Duration::from_millis(2 + i % 5)).await;
                }
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        assert_eq!(gate.state(), GateState::Idle);
    }
}
