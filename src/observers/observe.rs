//! # Status observer trait.
//!
//! [`Observe`] is the synchronous extension point for consumers of lot state
//! (a UI, a console printer, a test recorder). Its methods are called in-line,
//! right after the mutation they describe, by whichever task performed it.
//!
//! ## Rules
//! - Must not call back into the pool or gate.
//! - Must not block materially; hand work off to a channel if needed.
//! - Panics are caught and logged; other observers still run.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use lotvisor::{Observe, Status};
//!
//! #[derive(Default)]
//! struct PeakOccupancy(AtomicUsize);
//!
//! impl Observe for PeakOccupancy {
//!     fn on_status(&self, status: &Status) {
//!         self.0.fetch_max(status.occupied, Ordering::Relaxed);
//!     }
//!     fn name(&self) -> &'static str { "peak" }
//! }
//! ```

use crate::model::{SpotChange, Status};

/// Synchronous receiver of status and spot-change snapshots.
///
/// All methods default to no-ops so implementors override only what they need.
pub trait Observe: Send + Sync + 'static {
    /// Called after every state-mutating step with a fresh snapshot.
    fn on_status(&self, _status: &Status) {}

    /// Called for every successful acquire or release, under the pool lock and
    /// in the order the changes were applied.
    fn on_spot_changed(&self, _change: &SpotChange) {}

    /// Called exactly once, the first time the completion predicate holds.
    fn on_completed(&self, _status: &Status) {}

    /// Returns the observer name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
