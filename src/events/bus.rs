//! # Event bus for broadcasting lifecycle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that lets the
//! arrival loop, vehicle tasks, exit tasks and the notifier publish without blocking.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                     Listener (one):
//!   arrival loop ─┐
//!   vehicle task ─┼──────► Bus ───────► subscriber listener ────► SubscriberSet
//!   exit task    ─┤  (broadcast chan)     (in Simulation)
//!   Notifier     ─┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: one ring buffer of recent events shared by all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no receivers at send time.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events (cheap to clone).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Arc<Event>>,
}

impl Bus {
    /// Creates a new bus; capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(Arc::new(ev));
    }

    /// Creates a receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Event>> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_after_subscribe() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::VehicleArrived).with_vehicle(1));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::VehicleArrived).with_vehicle(2));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.vehicle, Some(2));
    }

    #[tokio::test]
    async fn lagging_receiver_is_told_how_much_it_missed() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();
        for id in 0..5 {
            bus.publish(Event::new(EventKind::VehicleArrived).with_vehicle(id));
        }
        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(n)) => assert_eq!(n, 3),
            other => panic!("expected lag, got {other:?}"),
        }
    }
}
