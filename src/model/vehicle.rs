//! # Vehicle and its lifecycle.
//!
//! ```text
//! Arriving ──► AttemptingEntry ──► Parked ──► Exiting ──► Left
//!                    │
//!                    ├──► RejectedPermanently   (retries exhausted)
//!                    └──► Abandoned             (shutdown while retrying)
//! ```
//!
//! `Left`, `RejectedPermanently` and `Abandoned` are terminal.

use std::fmt;
use std::time::Duration;

use super::spot::VehicleId;

/// Lifecycle state of a vehicle task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VehicleState {
    Arriving,
    AttemptingEntry,
    Parked,
    Exiting,
    Left,
    RejectedPermanently,
    Abandoned,
}

impl VehicleState {
    /// True for states with no outgoing transition.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            VehicleState::Left | VehicleState::RejectedPermanently | VehicleState::Abandoned
        )
    }

    /// True if `self → next` is a legal lifecycle step.
    pub fn can_transition(self, next: VehicleState) -> bool {
        use VehicleState::*;
        matches!(
            (self, next),
            (Arriving, AttemptingEntry)
                | (AttemptingEntry, Parked)
                | (AttemptingEntry, RejectedPermanently)
                | (AttemptingEntry, Abandoned)
                | (Parked, Exiting)
                | (Exiting, Left)
        )
    }

    /// Stable snake_case label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            VehicleState::Arriving => "arriving",
            VehicleState::AttemptingEntry => "attempting_entry",
            VehicleState::Parked => "parked",
            VehicleState::Exiting => "exiting",
            VehicleState::Left => "left",
            VehicleState::RejectedPermanently => "rejected_permanently",
            VehicleState::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// A vehicle owned by the task that represents it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Spot assigned on successful entry.
    pub spot: Option<usize>,
    /// How long the vehicle stays parked (zero until parked).
    pub dwell: Duration,
    state: VehicleState,
}

impl Vehicle {
    /// A freshly arrived vehicle.
    pub fn new(id: VehicleId) -> Self {
        Self {
            id,
            spot: None,
            dwell: Duration::ZERO,
            state: VehicleState::Arriving,
        }
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    /// Moves to `next` if the step is legal; returns whether it happened.
    pub fn transition(&mut self, next: VehicleState) -> bool {
        if !self.state.can_transition(next) {
            return false;
        }
        self.state = next;
        true
    }

    /// Records a successful entry: assigns the spot and dwell, moves to `Parked`.
    pub fn park(&mut self, spot: usize, dwell: Duration) -> bool {
        if !self.transition(VehicleState::Parked) {
            return false;
        }
        self.spot = Some(spot);
        self.dwell = dwell;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_legal() {
        let mut v = Vehicle::new(7);
        assert!(v.transition(VehicleState::AttemptingEntry));
        assert!(v.park(3, Duration::from_secs(4)));
        assert_eq!(v.spot, Some(3));
        assert!(v.transition(VehicleState::Exiting));
        assert!(v.transition(VehicleState::Left));
        assert!(v.state().is_terminal());
    }

    #[test]
    fn illegal_steps_are_refused() {
        let mut v = Vehicle::new(1);
        assert!(!v.park(0, Duration::ZERO), "cannot park before attempting entry");
        assert_eq!(v.spot, None);

        assert!(v.transition(VehicleState::AttemptingEntry));
        assert!(v.transition(VehicleState::RejectedPermanently));
        assert!(!v.transition(VehicleState::Parked), "terminal state is final");
        assert_eq!(v.state(), VehicleState::RejectedPermanently);
    }
}
