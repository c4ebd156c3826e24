/// Sequential vehicle identifier (starts at 1, grows with spawn time).
pub type VehicleId = u64;

/// One parking slot.
///
/// Owned by [`SpotPool`](crate::SpotPool) and only mutated under its lock;
/// `occupied` is derived from `occupant` so the two cannot disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spot {
    /// Position in the table (0-based).
    pub index: usize,
    /// Vehicle currently parked here.
    pub occupant: Option<VehicleId>,
}

impl Spot {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            occupant: None,
        }
    }

    /// True if a vehicle is parked here.
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub(crate) fn change(&self) -> SpotChange {
        SpotChange {
            index: self.index,
            occupied: self.is_occupied(),
            occupant: self.occupant,
        }
    }
}

/// Payload of the spot-changed callback, sent after every acquire/release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpotChange {
    pub index: usize,
    pub occupied: bool,
    pub occupant: Option<VehicleId>,
}
