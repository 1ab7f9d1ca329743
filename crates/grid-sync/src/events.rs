//! Broadcast event set and the per-connection subscriber registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::mpsc;

use grid_proto::{ChatMessage, TerminalMessage};
use grid_world::{Agent, Primitive};

const SUBSCRIBER_CHANNEL_CAPACITY: usize = 256;

/// One fan-out event, the Sync Fabric's broadcast vocabulary (spec.md
/// §4.6: "primitive insert/delete, agent presence changes, chat and
/// terminal messages, and directive state transitions").
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroadcastEvent {
    /// A primitive was placed.
    PrimitiveInserted(Primitive),
    /// A primitive was deleted.
    PrimitiveDeleted {
        /// Id of the removed primitive.
        id: String,
    },
    /// An agent came online (login or reconnect).
    AgentJoined(Agent),
    /// An agent's online session ended (logout or liveness eviction).
    AgentLeft {
        /// Id of the agent that left.
        id: String,
    },
    /// A chat message was committed.
    Chat(ChatMessage),
    /// A terminal/system message was committed.
    Terminal(TerminalMessage),
    /// A directive transitioned state (created, voted, completed).
    DirectiveTransition {
        /// Id of the directive.
        directive_id: String,
        /// Human-readable transition label (`"created"`, `"voted"`,
        /// `"completed"`).
        transition: String,
    },
}

/// Registry of per-connection broadcast channels.
///
/// `broadcast` never suspends and is safe to call from the synchronous
/// action pipeline; callers must invoke it only after their
/// `grid-world`/`grid-ledger` lock is released, per the design note in
/// spec.md §5. A subscriber whose channel is full misses the event rather
/// than stalling every other subscriber or the caller.
#[derive(Debug, Default)]
pub struct SyncFabric {
    subscribers: Mutex<HashMap<u64, mpsc::Sender<BroadcastEvent>>>,
    next_id: AtomicU64,
}

impl SyncFabric {
    /// Builds an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber, returning its connection id and the
    /// receiving half of its channel.
    pub fn subscribe(&self) -> (u64, mpsc::Receiver<BroadcastEvent>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id, tx);
        (id, rx)
    }

    /// Removes a subscriber, e.g. on disconnect.
    pub fn unsubscribe(&self, id: u64) {
        self.subscribers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&id);
    }

    /// Fans `event` out to every current subscriber, best-effort.
    pub fn broadcast(&self, event: &BroadcastEvent) {
        let subscribers = self.subscribers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for tx in subscribers.values() {
            let _ = tx.try_send(event.clone());
        }
    }

    /// Count of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let fabric = SyncFabric::new();
        let (_id1, mut rx1) = fabric.subscribe();
        let (_id2, mut rx2) = fabric.subscribe();

        fabric.broadcast(&BroadcastEvent::PrimitiveDeleted { id: "p1".to_string() });

        let got1 = rx1.recv().await.expect("subscriber 1 receives");
        let got2 = rx2.recv().await.expect("subscriber 2 receives");
        assert!(matches!(got1, BroadcastEvent::PrimitiveDeleted { id } if id == "p1"));
        assert!(matches!(got2, BroadcastEvent::PrimitiveDeleted { id } if id == "p1"));
    }

    #[tokio::test]
    async fn unsubscribe_stops_further_delivery() {
        let fabric = SyncFabric::new();
        let (id, mut rx) = fabric.subscribe();
        fabric.unsubscribe(id);
        assert_eq!(fabric.subscriber_count(), 0);

        fabric.broadcast(&BroadcastEvent::AgentLeft { id: "a1".to_string() });
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn a_full_channel_drops_the_event_rather_than_blocking() {
        let fabric = SyncFabric::new();
        let (_id, mut rx) = fabric.subscribe();
        for _ in 0..(SUBSCRIBER_CHANNEL_CAPACITY + 10) {
            fabric.broadcast(&BroadcastEvent::AgentLeft { id: "a1".to_string() });
        }
        let mut drained = 0;
        while rx.try_recv().is_ok() {
            drained += 1;
        }
        assert!(drained <= SUBSCRIBER_CHANNEL_CAPACITY);
    }
}
