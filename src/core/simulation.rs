//! # Simulation: arrival loop, task group and lifecycle control.
//!
//! [`Simulation`] owns the shared lot state and drives it to completion:
//!
//! ```text
//! run()
//!   ├─► spawn subscriber listener (Bus ──► SubscriberSet)
//!   ├─► start()                              SimulationStarted
//!   ├─► for id in 1..=quota:
//!   │     ├─ wait until running (or shutdown ─► stop arriving)
//!   │     ├─ sleep(clamp(next_interval()))
//!   │     └─ tracker.spawn(vehicle task)      VehicleArrived
//!   ├─► tracker.close()
//!   ├─► select:
//!   │     ├─ tracker.wait()     ─► Ok(final status)
//!   │     └─ token.cancelled()  ─► ShutdownRequested
//!   │                              timeout(grace, tracker.wait())
//!   │                                ├─ Ok  ─► AllStoppedWithin, Ok(status)
//!   │                                └─ Err ─► GraceExceeded, Err(GraceExceeded)
//!   └─► drain listener into subscribers, join their workers
//! ```
//!
//! ## Control surface
//! - [`Simulation::start`] / [`Simulation::stop`] toggle the cooperative `running`
//!   flag; arrivals and entry attempts wait at their next checkpoint.
//! - [`Simulation::shutdown_token`] cancels the run; vehicles still retrying are
//!   abandoned and parked vehicles finish their exits.
//! - [`Simulation::status`] and [`Simulation::spots`] read snapshots at any time.
//!
//! ## Example
//! ```no_run
//! use lotvisor::{Config, Simulation};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sim = Simulation::builder(Config::default()).with_seed(7).build()?;
//!     let status = sim.run().await?;
//!     assert!(status.completed);
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::RuntimeError;
use crate::events::{Event, EventKind};
use crate::gate::DirectionGate;
use crate::model::{Spot, Status, Vehicle};
use crate::pool::SpotPool;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::builder::SimulationBuilder;
use super::lot::Lot;
use super::vehicle;

/// A configured parking-lot simulation.
pub struct Simulation {
    lot: Arc<Lot>,
    tracker: TaskTracker,
    subscribers: Mutex<Vec<Arc<dyn Subscribe>>>,
    started: AtomicBool,
}

impl Simulation {
    /// Returns a builder for a simulation over `cfg`.
    pub fn builder(cfg: Config) -> SimulationBuilder {
        SimulationBuilder::new(cfg)
    }

    pub(super) fn new_internal(lot: Lot, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            lot: Arc::new(lot),
            tracker: TaskTracker::new(),
            subscribers: Mutex::new(subscribers),
            started: AtomicBool::new(false),
        }
    }

    /// Sets the `running` flag. Publishes `SimulationStarted` if it was clear.
    pub fn start(&self) {
        if !self.lot.run.start() {
            self.lot.publish(Event::new(EventKind::SimulationStarted));
        }
    }

    /// Clears the `running` flag. Publishes `SimulationPaused` if it was set.
    ///
    /// Sleeps already in flight are not interrupted.
    pub fn stop(&self) {
        if self.lot.run.stop() {
            self.lot.publish(Event::new(EventKind::SimulationPaused));
        }
    }

    pub fn is_running(&self) -> bool {
        self.lot.run.is_running()
    }

    /// Current snapshot.
    pub fn status(&self) -> Status {
        self.lot.status()
    }

    /// Copy of the spot table.
    pub fn spots(&self) -> Vec<Spot> {
        self.lot.pool.spots()
    }

    pub fn pool(&self) -> &SpotPool {
        &self.lot.pool
    }

    pub fn gate(&self) -> &DirectionGate {
        &self.lot.gate
    }

    pub fn config(&self) -> &Config {
        &self.lot.cfg
    }

    /// Token that requests a graceful shutdown when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.lot.token.clone()
    }

    /// Receiver for lifecycle events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Event>> {
        self.lot.bus.subscribe()
    }

    /// Runs arrivals until the quota is spawned, then waits for every vehicle.
    ///
    /// Returns the final status, [`RuntimeError::AlreadyStarted`] on a second
    /// call, or [`RuntimeError::GraceExceeded`] if a shutdown did not drain in time.
    pub async fn run(&self) -> Result<Status, RuntimeError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyStarted);
        }

        let listener_done = CancellationToken::new();
        let listener = self.subscriber_listener(listener_done.clone());

        self.start();
        let result = self.drive().await;

        listener_done.cancel();
        if let Some(handle) = listener {
            let _ = handle.await;
        }
        result
    }

    async fn drive(&self) -> Result<Status, RuntimeError> {
        self.arrivals().await;
        self.tracker.close();

        let token = &self.lot.token;
        tokio::select! {
            biased;
            _ = self.tracker.wait() => {
                let status = self.lot.status();
                info!(%status, "simulation finished");
                Ok(status)
            }
            _ = token.cancelled() => self.wait_all_with_grace().await,
        }
    }

    async fn arrivals(&self) {
        let lot = &self.lot;
        for id in 1..=lot.cfg.quota {
            if !lot.run.wait_running(&lot.token).await {
                debug!(next = id, "arrivals stopped by shutdown");
                return;
            }
            let gap = lot.cfg.clamp_arrival(lot.arrivals.next_interval());
            time::sleep(gap).await;
            if lot.token.is_cancelled() {
                debug!(next = id, "arrivals stopped by shutdown");
                return;
            }

            lot.pool.record_arrived();
            lot.publish(
                Event::new(EventKind::VehicleArrived)
                    .with_vehicle(id)
                    .with_delay(gap),
            );
            self.tracker.spawn(vehicle::drive(
                Arc::clone(lot),
                self.tracker.clone(),
                Vehicle::new(id),
            ));
            lot.publish_status();
        }
    }

    async fn wait_all_with_grace(&self) -> Result<Status, RuntimeError> {
        let lot = &self.lot;
        lot.publish(Event::new(EventKind::ShutdownRequested));
        info!(grace = ?lot.cfg.grace, "shutdown requested; draining vehicles");

        let grace = lot.cfg.grace;
        match time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => {
                lot.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(lot.status())
            }
            Err(_) => {
                let active = lot.active();
                lot.publish(Event::new(EventKind::GraceExceeded).with_count(active));
                warn!(?grace, active, "grace period exceeded");
                Err(RuntimeError::GraceExceeded { grace, active })
            }
        }
    }

    /// Forwards bus events to the subscriber set until `done`, then drains what is queued.
    fn subscriber_listener(&self, done: CancellationToken) -> Option<JoinHandle<()>> {
        let subs = std::mem::take(
            &mut *self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if subs.is_empty() {
            return None;
        }

        let mut rx = self.lot.bus.subscribe();
        let set = SubscriberSet::new(subs, self.lot.bus.clone());
        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit_arc(ev),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "subscriber listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = done.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => set.emit_arc(ev),
                                Err(TryRecvError::Lagged(skipped)) => {
                                    warn!(skipped, "subscriber listener lagged");
                                }
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
            set.shutdown().await;
        }))
    }
}
