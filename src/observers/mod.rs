//! Synchronous status observers.
//!
//! - [`Observe`] trait implemented by snapshot consumers
//! - [`Notifier`] in-line fan-out plus the one-shot completion latch
//!
//! Observers see plain values ([`Status`](crate::Status), [`SpotChange`](crate::SpotChange))
//! and never touch synchronization state. For asynchronous, queued delivery of
//! lifecycle events use [`Subscribe`](crate::Subscribe) instead.

mod notifier;
mod observe;

pub use notifier::Notifier;
pub use observe::Observe;
