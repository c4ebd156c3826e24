//! # lotvisor
//!
//! **Lotvisor** is a concurrent parking-lot simulator built on Tokio.
//!
//! Vehicles arrive by a Poisson process, compete for a fixed set of spots and
//! share a single lane that admits one traffic direction at a time. Refused
//! vehicles back off and retry a bounded number of times; parked vehicles dwell
//! for a random time and then leave through the same lane.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                 ┌──────────────────┐
//!                 │  ArrivalProcess  │  Δt = -ln(u)/λ, clamped
//!                 └────────┬─────────┘
//!                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Simulation (arrival loop + TaskTracker)                          │
//! │  - RunFlag (pause / resume)                                       │
//! │  - CancellationToken (graceful shutdown, grace period)           │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ vehicle task │   │ vehicle task │   │ vehicle task │  retry_with_backoff
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ enter()/exit()   │ try_acquire()    │ release()
//!      ▼                  ▼                  ▼
//! ┌───────────────┐  ┌────────────────────────┐
//! │ DirectionGate │  │ SpotPool (one lock)    │──► Notifier ──► Observe (sync)
//! │ Idle/Entry(n)/│  │ occupied + available   │        │
//! │ Exit(m)       │  │   == capacity          │        ▼
//! └───────────────┘  └────────────────────────┘   on_completed (once)
//!
//! all tasks ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet
//!                                                                  ├─► LogWriter
//!                                                                  └─► Subscribe ...
//! ```
//!
//! ### Vehicle lifecycle
//! ```text
//! Arriving ─► AttemptingEntry ─┬─► Parked ─► Exiting ─► Left
//!                              ├─► RejectedPermanently   (retries exhausted)
//!                              └─► Abandoned             (shutdown while waiting)
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------|---------------------------------------------|
//! | **Simulation**    | Arrival loop, control surface, graceful shutdown.           | [`Simulation`], [`SimulationBuilder`]       |
//! | **Resources**     | Spot allocation and one-direction lane arbitration.         | [`SpotPool`], [`DirectionGate`]             |
//! | **Policies**      | Bounded entry retries with backoff and jitter.              | [`RetryPolicy`], [`BackoffPolicy`]          |
//! | **Observers**     | Synchronous status and spot-change snapshots.               | [`Observe`], [`Status`], [`SpotChange`]     |
//! | **Subscribers**   | Queued delivery of lifecycle events.                        | [`Subscribe`], [`Event`], [`EventKind`]     |
//! | **Errors**        | Typed configuration and runtime errors.                     | [`ConfigError`], [`RuntimeError`]           |
//! | **Configuration** | Validated settings with sensible defaults.                  | [`Config`], [`DurationRange`]               |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], which renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use lotvisor::{Config, DurationRange, Simulation};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         capacity: 2,
//!         quota: 4,
//!         dwell: DurationRange::fixed(Duration::from_millis(20)),
//!         arrival_clamp: DurationRange::fixed(Duration::from_millis(5)),
//!         ..Config::default()
//!     };
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn lotvisor::Subscribe>> = vec![Arc::new(lotvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn lotvisor::Subscribe>> = Vec::new();
//!
//!     let sim = Simulation::builder(cfg)
//!         .with_subscribers(subs)
//!         .with_seed(1)
//!         .build()?;
//!
//!     let status = sim.run().await?;
//!     assert_eq!(status.processed, 4);
//!     assert_eq!(status.occupied, 0);
//!     Ok(())
//! }
//! ```
mod arrival;
mod config;
mod core;
mod error;
mod events;
mod gate;
mod model;
mod observers;
mod policies;
mod pool;
mod subscribers;

// ---- Public re-exports ----

pub use arrival::ArrivalProcess;
pub use config::{Config, DurationRange};
pub use core::{
    EntryRefusal, RunFlag, Simulation, SimulationBuilder, cancel_on_signal,
    wait_for_shutdown_signal,
};
pub use error::{ConfigError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use gate::{DirectionGate, EntryPass, ExitPass, GateState};
pub use model::{Direction, Spot, SpotChange, Status, Vehicle, VehicleId, VehicleState};
pub use observers::{Notifier, Observe};
pub use policies::{BackoffPolicy, JitterPolicy, RetryOutcome, RetryPolicy, retry_with_backoff};
pub use pool::{PoolSnapshot, SpotPool, Tally};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in tracing renderer for lifecycle events.
// Disable with: `--no-default-features`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
