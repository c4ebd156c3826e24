//! Bounded spot allocation.
//!
//! - [`SpotPool`] lock-guarded slot table with non-blocking acquire and validated release
//! - [`PoolSnapshot`] occupancy and vehicle [`Tally`] read under the pool lock

mod spot_pool;

pub use spot_pool::{PoolSnapshot, SpotPool, Tally};
