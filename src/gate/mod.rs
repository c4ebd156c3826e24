//! Single-lane direction arbitration.
//!
//! - [`DirectionGate`] admits bursts of same-direction crossings
//! - [`EntryPass`] / [`ExitPass`] end a crossing when dropped
//! - [`GateState`] idle or burst with the crossing count

mod direction_gate;

pub use direction_gate::{DirectionGate, EntryPass, ExitPass, GateState};
