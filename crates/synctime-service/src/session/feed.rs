//! Push feed: the consumer that turns `newNotification` events into store
//! and badge updates.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use synctime_core::result::AppResult;
use synctime_core::types::id::UserId;
use synctime_entity::PushNotification;
use synctime_realtime::{
    ChannelHub, ChannelLease, ChannelState, EVENT_NEW_NOTIFICATION, Subscription,
};

use crate::notification::service::NotificationService;
use crate::view::badge::BadgeCounter;

/// A mounted push consumer.
///
/// Dropping the feed deregisters its handler first and then releases the
/// channel lease, so no update lands after unmount.
#[derive(Debug)]
pub struct NotificationFeed {
    // Field order is drop order.
    subscription: Subscription,
    lease: ChannelLease,
}

impl NotificationFeed {
    /// Subscribes to the user's channel, opening it if no one else has.
    pub fn mount(
        hub: &ChannelHub,
        user_id: &UserId,
        service: Arc<NotificationService>,
        badge: Arc<BadgeCounter>,
    ) -> AppResult<Self> {
        let lease = hub.acquire(user_id)?;
        let subscription = lease.subscribe(EVENT_NEW_NOTIFICATION, move |data: &Value| {
            handle_push(&service, &badge, data);
        })?;
        debug!(%user_id, "Notification feed mounted");

        Ok(Self {
            subscription,
            lease,
        })
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    pub fn watch_channel(&self) -> watch::Receiver<ChannelState> {
        self.lease.watch_state()
    }

    /// Unmounts explicitly.
    pub fn unmount(self) {
        drop(self);
    }
}

fn handle_push(service: &NotificationService, badge: &BadgeCounter, data: &Value) {
    let push = match serde_json::from_value::<PushNotification>(data.clone()) {
        Ok(push) => push,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed push notification");
            return;
        }
    };

    let inserted = service.ingest(&push);
    // A repeated id still carries an authoritative count.
    if inserted || push.count.is_some() {
        badge.apply_push(&push);
    }
    debug!(id = %push.id, inserted, "Push notification handled");
}
