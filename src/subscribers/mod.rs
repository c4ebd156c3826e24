//! # Event subscribers.
//!
//! Asynchronous consumers of lifecycle events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ```text
//! vehicle task ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet
//!                                                                     ├──► LogWriter
//!                                                                     └──► custom ...
//! ```
//!
//! - [`Subscribe`] trait for custom subscribers
//! - [`SubscriberSet`] per-subscriber bounded queues and workers
//! - [`LogWriter`] built-in `tracing` renderer (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
