//! # Lifecycle events emitted by the simulation and vehicle tasks.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Run events**: start, pause, completion
//! - **Vehicle events**: arrival, refusal, backoff, parking, exit, terminal outcomes
//! - **Shutdown events**: shutdown requested, drained within grace, grace exceeded
//! - **Subscriber events**: overflow and panic reports
//!
//! The [`Event`] struct carries optional metadata such as vehicle id, spot,
//! attempt number and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use lotvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_vehicle(42)
//!     .with_attempt(3)
//!     .with_delay(Duration::from_millis(100))
//!     .with_reason("lot_full");
//!
//! assert_eq!(ev.vehicle, Some(42));
//! assert_eq!(ev.delay_ms, Some(100));
//! assert_eq!(ev.reason.as_deref(), Some("lot_full"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::model::VehicleId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Run events ===
    /// The `running` flag was set (first start or resume).
    SimulationStarted,

    /// The `running` flag was cleared.
    SimulationPaused,

    /// Completion predicate held for the first time.
    ///
    /// Sets:
    /// - `attempt`: processed vehicles
    SimulationCompleted,

    // === Vehicle events ===
    /// A vehicle was spawned by the arrival loop.
    ///
    /// Sets:
    /// - `vehicle`: vehicle id
    /// - `delay_ms`: inter-arrival gap that preceded it
    VehicleArrived,

    /// An entry attempt was refused.
    ///
    /// Sets:
    /// - `vehicle`, `attempt`
    /// - `reason`: `gate_closed` or `lot_full`
    EntryRefused,

    /// Next entry attempt scheduled after a refusal.
    ///
    /// Sets:
    /// - `vehicle`, `attempt` (the refused one)
    /// - `delay_ms`: delay before the next attempt
    /// - `reason`: refusal reason
    BackoffScheduled,

    /// Vehicle acquired a spot.
    ///
    /// Sets:
    /// - `vehicle`, `spot`, `attempt`
    /// - `delay_ms`: sampled dwell duration
    VehicleParked,

    /// Vehicle entered the exit lane.
    ///
    /// Sets:
    /// - `vehicle`, `spot`
    ExitStarted,

    /// Vehicle released its spot and cleared the lane (terminal).
    ///
    /// Sets:
    /// - `vehicle`, `spot`
    VehicleLeft,

    /// Vehicle exhausted its entry retries (terminal).
    ///
    /// Sets:
    /// - `vehicle`, `attempt`
    VehicleRejected,

    /// Vehicle stopped retrying because of shutdown (terminal, not processed).
    ///
    /// Sets:
    /// - `vehicle`, `attempt`
    VehicleAbandoned,

    // === Shutdown events ===
    /// Shutdown requested (OS signal or explicit cancel).
    ShutdownRequested,

    /// All vehicle tasks finished within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some vehicles were still active.
    ///
    /// Sets:
    /// - `attempt`: active vehicles
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and cause
    SubscriberOverflow,
}

impl EventKind {
    /// Stable snake_case label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            EventKind::SimulationStarted => "simulation_started",
            EventKind::SimulationPaused => "simulation_paused",
            EventKind::SimulationCompleted => "simulation_completed",
            EventKind::VehicleArrived => "vehicle_arrived",
            EventKind::EntryRefused => "entry_refused",
            EventKind::BackoffScheduled => "backoff_scheduled",
            EventKind::VehicleParked => "vehicle_parked",
            EventKind::ExitStarted => "exit_started",
            EventKind::VehicleLeft => "vehicle_left",
            EventKind::VehicleRejected => "vehicle_rejected",
            EventKind::VehicleAbandoned => "vehicle_abandoned",
            EventKind::ShutdownRequested => "shutdown_requested",
            EventKind::AllStoppedWithin => "all_stopped_within",
            EventKind::GraceExceeded => "grace_exceeded",
            EventKind::SubscriberPanicked => "subscriber_panicked",
            EventKind::SubscriberOverflow => "subscriber_overflow",
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Vehicle the event is about, if any.
    pub vehicle: Option<VehicleId>,
    /// Spot index, if any.
    pub spot: Option<usize>,
    /// Attempt number (1-based) or a count, depending on the kind.
    pub attempt: Option<u32>,
    /// Delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            vehicle: None,
            spot: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    #[inline]
    pub fn with_vehicle(mut self, id: VehicleId) -> Self {
        self.vehicle = Some(id);
        self
    }

    #[inline]
    pub fn with_spot(mut self, index: usize) -> Self {
        self.spot = Some(index);
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a count, saturating at `u32::MAX`.
    #[inline]
    pub fn with_count(self, n: u64) -> Self {
        self.with_attempt(n.min(u64::from(u32::MAX)) as u32)
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    /// True for events that end a vehicle's lifecycle.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::VehicleLeft | EventKind::VehicleRejected | EventKind::VehicleAbandoned
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::VehicleArrived);
        let b = Event::new(EventKind::VehicleArrived);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delay_and_count_saturate() {
        let ev = Event::new(EventKind::GraceExceeded)
            .with_count(u64::MAX)
            .with_delay(Duration::from_secs(u64::MAX / 2));
        assert_eq!(ev.attempt, Some(u32::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn terminal_kinds() {
        assert!(Event::new(EventKind::VehicleLeft).is_terminal());
        assert!(Event::new(EventKind::VehicleRejected).is_terminal());
        assert!(!Event::new(EventKind::VehicleParked).is_terminal());
    }
}
