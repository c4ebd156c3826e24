//! # LogWriter: lifecycle events to `tracing`
//!
//! A subscriber that renders every [`Event`] as one structured `tracing` record
//! under the `lotvisor::events` target. Vehicle traffic logs at `debug`, run and
//! shutdown milestones at `info`, refusals at `debug`, and subscriber faults and
//! grace overruns at `warn`.
//!
//! ## Example output (pretty formatter)
//! ```text
//! INFO  lotvisor::events: simulation started
//! DEBUG lotvisor::events: vehicle arrived vehicle=1 gap_ms=212
//! DEBUG lotvisor::events: vehicle parked vehicle=1 spot=0 attempt=1 dwell_ms=4120
//! DEBUG lotvisor::events: backoff scheduled vehicle=7 attempt=2 delay_ms=100 reason=lot_full
//! DEBUG lotvisor::events: vehicle left vehicle=1 spot=0
//! INFO  lotvisor::events: simulation completed processed=100
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::SimulationStarted => info!(target: "lotvisor::events", "simulation started"),
            EventKind::SimulationPaused => info!(target: "lotvisor::events", "simulation paused"),
            EventKind::SimulationCompleted => {
                info!(target: "lotvisor::events", processed = e.attempt, "simulation completed");
            }
            EventKind::VehicleArrived => {
                debug!(target: "lotvisor::events", vehicle = e.vehicle, gap_ms = e.delay_ms, "vehicle arrived");
            }
            EventKind::EntryRefused => {
                debug!(
                    target: "lotvisor::events",
                    vehicle = e.vehicle,
                    attempt = e.attempt,
                    reason,
                    "entry refused"
                );
            }
            EventKind::BackoffScheduled => {
                debug!(
                    target: "lotvisor::events",
                    vehicle = e.vehicle,
                    attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    reason,
                    "backoff scheduled"
                );
            }
            EventKind::VehicleParked => {
                debug!(
                    target: "lotvisor::events",
                    vehicle = e.vehicle,
                    spot = e.spot,
                    attempt = e.attempt,
                    dwell_ms = e.delay_ms,
                    "vehicle parked"
                );
            }
            EventKind::ExitStarted => {
                debug!(target: "lotvisor::events", vehicle = e.vehicle, spot = e.spot, "exit started");
            }
            EventKind::VehicleLeft => {
                debug!(target: "lotvisor::events", vehicle = e.vehicle, spot = e.spot, "vehicle left");
            }
            EventKind::VehicleRejected => {
                info!(target: "lotvisor::events", vehicle = e.vehicle, attempts = e.attempt, "vehicle rejected");
            }
            EventKind::VehicleAbandoned => {
                info!(target: "lotvisor::events", vehicle = e.vehicle, attempts = e.attempt, "vehicle abandoned");
            }
            EventKind::ShutdownRequested => info!(target: "lotvisor::events", "shutdown requested"),
            EventKind::AllStoppedWithin => {
                info!(target: "lotvisor::events", "all vehicles stopped within grace");
            }
            EventKind::GraceExceeded => {
                warn!(target: "lotvisor::events", active = e.attempt, "grace exceeded");
            }
            EventKind::SubscriberPanicked => {
                warn!(target: "lotvisor::events", reason, "subscriber panicked");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "lotvisor::events", reason, "subscriber overflow");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
