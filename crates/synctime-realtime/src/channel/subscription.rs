//! Cancellable subscription guard.

use std::sync::{Arc, Weak};

use uuid::Uuid;

use super::gate::DeliveryGate;
use super::registry::HandlerRegistry;

/// Unique subscription identifier.
pub type SubscriptionId = Uuid;

/// A live handler registration.
///
/// The handler stays registered until [`Subscription::unsubscribe`] is
/// called or the guard is dropped, whichever comes first. Deregistration
/// happens exactly once and returns only after a delivery already running
/// on another thread has finished.
#[must_use = "dropping a Subscription immediately unregisters its handler"]
pub struct Subscription {
    id: SubscriptionId,
    event: String,
    registry: Weak<HandlerRegistry>,
    gate: Arc<DeliveryGate>,
    released: bool,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("released", &self.released)
            .finish()
    }
}

impl Subscription {
    /// Registers `handler` on `registry` and returns its guard.
    pub(crate) fn register(
        registry: &Arc<HandlerRegistry>,
        event: &str,
        handler: super::registry::EventHandler,
    ) -> Self {
        let (id, gate) = registry.insert(event, handler);
        Self {
            id,
            event: event.to_string(),
            registry: Arc::downgrade(registry),
            gate,
            released: false,
        }
    }

    /// Subscription id.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Event this subscription listens to.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        !self.released && self.gate.is_open()
    }

    /// Unregisters the handler.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match self.registry.upgrade() {
            Some(registry) => {
                registry.remove(&self.event, self.id);
            }
            None => self.gate.close(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
