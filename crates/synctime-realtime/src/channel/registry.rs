//! Handler registry: fan-out of inbound events to subscribers.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use super::gate::DeliveryGate;
use super::subscription::SubscriptionId;

/// Callback invoked with an event's payload.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// One registered handler.
struct HandlerEntry {
    id: SubscriptionId,
    handler: EventHandler,
    gate: Arc<DeliveryGate>,
}

/// Registry of event handlers for one user channel.
#[derive(Default)]
pub struct HandlerRegistry {
    /// Event name → handlers, in registration order.
    handlers: DashMap<String, Vec<HandlerEntry>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("events", &self.handlers.len())
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and returns its id plus its delivery gate.
    pub(crate) fn insert(
        &self,
        event: &str,
        handler: EventHandler,
    ) -> (SubscriptionId, Arc<DeliveryGate>) {
        let id = SubscriptionId::new_v4();
        let gate = Arc::new(DeliveryGate::new());
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(HandlerEntry {
                id,
                handler,
                gate: Arc::clone(&gate),
            });
        (id, gate)
    }

    /// Removes one handler. Returns whether it was registered.
    ///
    /// Blocks until a delivery to that handler running on another thread
    /// has returned, so nothing reaches it once this returns.
    pub(crate) fn remove(&self, event: &str, id: SubscriptionId) -> bool {
        let mut removed = None;
        if let Some(mut entries) = self.handlers.get_mut(event) {
            if let Some(pos) = entries.iter().position(|entry| entry.id == id) {
                removed = Some(entries.remove(pos).gate);
            }
            if entries.is_empty() {
                drop(entries);
                self.handlers.remove_if(event, |_, v| v.is_empty());
            }
        }

        // Map locks are released before waiting on the gate.
        match removed {
            Some(gate) => {
                gate.close();
                true
            }
            None => false,
        }
    }

    /// Removes every handler, waiting out in-flight deliveries.
    pub(crate) fn clear(&self) {
        let gates: Vec<Arc<DeliveryGate>> = self
            .handlers
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .map(|h| Arc::clone(&h.gate))
                    .collect::<Vec<_>>()
            })
            .collect();
        self.handlers.clear();
        for gate in gates {
            gate.close();
        }
    }

    /// Delivers a payload to every handler of `event`. Returns the number
    /// of handlers invoked.
    ///
    /// Handlers are invoked outside the map lock, so a handler may
    /// subscribe or unsubscribe without deadlocking. Each call runs inside
    /// the handler's gate, so a removed handler is never entered.
    pub fn dispatch(&self, event: &str, data: &Value) -> usize {
        let targets: Vec<(EventHandler, Arc<DeliveryGate>)> = match self.handlers.get(event) {
            Some(entries) => entries
                .iter()
                .map(|e| (Arc::clone(&e.handler), Arc::clone(&e.gate)))
                .collect(),
            None => Vec::new(),
        };

        let mut delivered = 0;
        for (handler, gate) in &targets {
            if let Some(_delivery) = gate.enter() {
                handler(data);
                delivered += 1;
            }
        }

        if delivered == 0 {
            debug!(event, "No handler registered for event");
        }
        delivered
    }

    /// Number of handlers registered for an event.
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map(|e| e.len()).unwrap_or(0)
    }

    /// Total handlers across all events.
    pub fn total_handlers(&self) -> usize {
        self.handlers.iter().map(|e| e.value().len()).sum()
    }
}
