//! Runtime core: arrivals, vehicle lifecycles and shutdown.
//!
//! The public API from this module is [`Simulation`] (with its
//! [`SimulationBuilder`]), the pause/resume [`RunFlag`], the entry refusal
//! reasons and the signal helpers.
//!
//! Internal modules:
//! - `lot`: shared state of one run (pool, gate, counters, notifier, bus);
//! - `vehicle`: one vehicle's retry loop, parking and deferred departure;
//! - `simulation`: arrival loop, task group, grace-bounded shutdown;
//! - `builder`: validation and assembly;
//! - `shutdown`: cross-platform termination signals.

mod builder;
mod lot;
mod run_flag;
mod shutdown;
mod simulation;
mod vehicle;

pub use builder::SimulationBuilder;
pub use lot::EntryRefusal;
pub use run_flag::RunFlag;
pub use shutdown::{cancel_on_signal, wait_for_shutdown_signal};
pub use simulation::Simulation;
