//! # Vehicle task: one arrival from entry attempts to departure.
//!
//! ```text
//! drive(vehicle)
//!   ├─► retry_with_backoff(try_enter)
//!   │     ├─ refused ─► EntryRefused, BackoffScheduled{delay}
//!   │     ├─ Accepted{(spot, pass)}
//!   │     │     ├─► VehicleParked{spot, dwell}
//!   │     │     ├─► sleep(entry transit), drop(pass)
//!   │     │     └─► tracker.spawn(depart)
//!   │     ├─ RejectedPermanently ─► VehicleRejected (processed)
//!   │     └─ Cancelled           ─► VehicleAbandoned (not processed)
//!   └─► publish status
//!
//! depart(vehicle)
//!   ├─► sleep(dwell)
//!   ├─► gate.exit().await          (polls while entries cross)
//!   ├─► ExitStarted, pool.release(spot)
//!   ├─► sleep(exit transit), drop(pass)
//!   └─► VehicleLeft (processed), publish status
//! ```
//!
//! Dwell and transit sleeps are not interrupted by pause or shutdown, so a parked
//! vehicle always completes its exit.

use std::sync::Arc;

use tokio::time;
use tokio_util::task::TaskTracker;
use tracing::warn;

use crate::events::{Event, EventKind};
use crate::model::{Vehicle, VehicleState};
use crate::policies::{RetryOutcome, retry_with_backoff};

use super::lot::{EntryRefusal, Lot};

pub(super) async fn drive(lot: Arc<Lot>, tracker: TaskTracker, mut vehicle: Vehicle) {
    let id = vehicle.id;
    advance(&mut vehicle, VehicleState::AttemptingEntry);

    let shared: &Lot = &lot;
    let outcome = retry_with_backoff(
        &shared.cfg.retry,
        &shared.run,
        &shared.token,
        move |_attempt| shared.try_enter(id),
        move |refusal: &EntryRefusal, attempt, delay| {
            shared.publish(
                Event::new(EventKind::EntryRefused)
                    .with_vehicle(id)
                    .with_attempt(attempt)
                    .with_reason(refusal.as_label()),
            );
            if let Some(delay) = delay {
                shared.publish(
                    Event::new(EventKind::BackoffScheduled)
                        .with_vehicle(id)
                        .with_attempt(attempt)
                        .with_delay(delay)
                        .with_reason(refusal.as_label()),
                );
            }
        },
    )
    .await;

    match outcome {
        RetryOutcome::Accepted {
            value: (spot, pass),
            attempts,
        } => {
            let dwell = shared.sample(&shared.cfg.dwell);
            if !vehicle.park(spot, dwell) {
                warn!(
                    vehicle = id,
                    spot,
                    state = vehicle.state().as_label(),
                    "park refused by vehicle state"
                );
            }
            shared.publish(
                Event::new(EventKind::VehicleParked)
                    .with_vehicle(id)
                    .with_spot(spot)
                    .with_attempt(attempts)
                    .with_delay(dwell),
            );
            shared.publish_status();

            time::sleep(shared.sample(&shared.cfg.entry_transit)).await;
            drop(pass);
            shared.publish_status();

            tracker.spawn(depart(Arc::clone(&lot), vehicle));
        }
        RetryOutcome::RejectedPermanently { attempts } => {
            advance(&mut vehicle, VehicleState::RejectedPermanently);
            shared.pool.record_rejected();
            shared.publish(
                Event::new(EventKind::VehicleRejected)
                    .with_vehicle(id)
                    .with_attempt(attempts),
            );
            shared.publish_status();
        }
        RetryOutcome::Cancelled { attempts } => {
            advance(&mut vehicle, VehicleState::Abandoned);
            shared.pool.record_abandoned();
            shared.publish(
                Event::new(EventKind::VehicleAbandoned)
                    .with_vehicle(id)
                    .with_attempt(attempts),
            );
            shared.publish_status();
        }
    }
}

async fn depart(lot: Arc<Lot>, mut vehicle: Vehicle) {
    let id = vehicle.id;
    time::sleep(vehicle.dwell).await;

    let pass = lot.gate.exit().await;
    advance(&mut vehicle, VehicleState::Exiting);
    let mut started = Event::new(EventKind::ExitStarted).with_vehicle(id);
    match vehicle.spot {
        Some(spot) => {
            started = started.with_spot(spot);
            lot.publish(started);
            if !lot.pool.release(spot, id) {
                warn!(vehicle = id, spot, "departing vehicle did not hold its spot");
            }
        }
        None => {
            warn!(vehicle = id, "departing vehicle has no spot");
            lot.publish(started);
        }
    }
    lot.publish_status();

    time::sleep(lot.sample(&lot.cfg.exit_transit)).await;
    drop(pass);

    advance(&mut vehicle, VehicleState::Left);
    lot.pool.record_left();
    let mut left = Event::new(EventKind::VehicleLeft).with_vehicle(id);
    if let Some(spot) = vehicle.spot {
        left = left.with_spot(spot);
    }
    lot.publish(left);
    lot.publish_status();
}

/// Applies `next`, logging a refused transition; the state is unchanged on refusal.
fn advance(vehicle: &mut Vehicle, next: VehicleState) -> bool {
    let from = vehicle.state();
    let moved = vehicle.transition(next);
    if !moved {
        warn!(
            vehicle = vehicle.id,
            from = from.as_label(),
            to = next.as_label(),
            "vehicle transition refused"
        );
    }
    moved
}
