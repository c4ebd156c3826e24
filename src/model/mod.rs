//! Shared data model: spots, vehicles and status snapshots.
//!
//! - [`Spot`] / [`SpotChange`] slot table entries and their change notifications
//! - [`Vehicle`] / [`VehicleState`] per-task vehicle and its lifecycle
//! - [`Status`] / [`Direction`] value snapshots handed to observers

mod spot;
mod status;
mod vehicle;

pub use spot::{Spot, SpotChange, VehicleId};
pub use status::{Direction, Status};
pub use vehicle::{Vehicle, VehicleState};
