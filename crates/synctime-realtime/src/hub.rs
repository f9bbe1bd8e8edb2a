//! Channel hub: reference-counted push channels, one per signed-in user.
//!
//! The first [`ChannelHub::acquire`] for a user opens the channel; dropping
//! the last [`ChannelLease`] for that user cancels its connection task and
//! removes every handler still registered.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use synctime_core::config::realtime::RealtimeConfig;
use synctime_core::error::AppError;
use synctime_core::result::AppResult;
use synctime_core::types::id::UserId;

use crate::channel::registry::{EventHandler, HandlerRegistry};
use crate::channel::state::ChannelState;
use crate::channel::subscription::Subscription;
use crate::connection::transport::{Transport, WsTransport};
use crate::connection::worker::Worker;
use crate::message::validator::validate_event_name;

/// One user's open channel.
#[derive(Debug)]
struct UserChannel {
    registry: Arc<HandlerRegistry>,
    state: watch::Receiver<ChannelState>,
    cancel: CancellationToken,
}

impl UserChannel {
    fn close(&self) {
        self.cancel.cancel();
        self.registry.clear();
    }
}

/// Channel plus the number of leases holding it open.
#[derive(Debug)]
struct ChannelEntry {
    channel: Arc<UserChannel>,
    leases: usize,
}

struct HubInner {
    transport: Arc<dyn Transport>,
    config: RealtimeConfig,
    channels: DashMap<UserId, ChannelEntry>,
}

impl HubInner {
    fn open(&self, user_id: &UserId) -> Arc<UserChannel> {
        let registry = Arc::new(HandlerRegistry::new());
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting);
        let cancel = CancellationToken::new();

        let worker = Worker {
            user_id: user_id.clone(),
            transport: Arc::clone(&self.transport),
            registry: Arc::clone(&registry),
            state: state_tx,
            config: self.config.clone(),
            cancel: cancel.clone(),
        };
        tokio::spawn(worker.run());

        Arc::new(UserChannel {
            registry,
            state: state_rx,
            cancel,
        })
    }

    fn release(&self, user_id: &UserId) {
        let closed = match self.channels.entry(user_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.leases = entry.leases.saturating_sub(1);
                if entry.leases == 0 {
                    Some(occupied.remove().channel)
                } else {
                    None
                }
            }
            Entry::Vacant(_) => None,
        };

        match closed {
            Some(channel) => {
                info!(%user_id, "Last consumer released; closing push channel");
                channel.close();
            }
            None => debug!(%user_id, "Channel lease released"),
        }
    }
}

/// Registry of per-user push channels.
#[derive(Clone)]
pub struct ChannelHub {
    inner: Arc<HubInner>,
}

impl std::fmt::Debug for ChannelHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHub")
            .field("url", &self.inner.config.url)
            .field("channels", &self.inner.channels.len())
            .finish()
    }
}

impl ChannelHub {
    /// Creates a hub over any transport.
    pub fn new(transport: Arc<dyn Transport>, config: RealtimeConfig) -> Self {
        Self {
            inner: Arc::new(HubInner {
                transport,
                config,
                channels: DashMap::new(),
            }),
        }
    }

    /// Creates a hub over WebSocket.
    pub fn websocket(config: RealtimeConfig) -> Self {
        Self::new(Arc::new(WsTransport::new()), config)
    }

    /// Takes a lease on `user_id`'s channel, opening it if needed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn acquire(&self, user_id: &UserId) -> AppResult<ChannelLease> {
        if user_id.is_empty() {
            return Err(AppError::validation(
                "Cannot open a push channel without a user id",
            ));
        }

        let channel = {
            let mut entry = self
                .inner
                .channels
                .entry(user_id.clone())
                .or_insert_with(|| ChannelEntry {
                    channel: self.inner.open(user_id),
                    leases: 0,
                });
            entry.leases += 1;
            debug!(%user_id, leases = entry.leases, "Channel lease acquired");
            Arc::clone(&entry.channel)
        };

        Ok(ChannelLease {
            hub: Arc::clone(&self.inner),
            user_id: user_id.clone(),
            channel,
        })
    }

    /// Number of open user channels.
    pub fn active_channels(&self) -> usize {
        self.inner.channels.len()
    }

    /// Number of leases held on a user's channel.
    pub fn lease_count(&self, user_id: &UserId) -> usize {
        self.inner
            .channels
            .get(user_id)
            .map(|e| e.leases)
            .unwrap_or(0)
    }
}

/// A consumer's hold on a user channel. Dropping it releases the hold.
pub struct ChannelLease {
    hub: Arc<HubInner>,
    user_id: UserId,
    channel: Arc<UserChannel>,
}

impl std::fmt::Debug for ChannelLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelLease")
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl ChannelLease {
    /// User this lease belongs to.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Registers a handler for `event`.
    pub fn subscribe<F>(&self, event: &str, handler: F) -> AppResult<Subscription>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        validate_event_name(event)?;
        if self.channel.cancel.is_cancelled() {
            return Err(AppError::channel("Push channel is closed"));
        }
        let handler: EventHandler = Arc::new(handler);
        Ok(Subscription::register(&self.channel.registry, event, handler))
    }

    /// Current channel state.
    pub fn state(&self) -> ChannelState {
        self.channel.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.channel.state.clone()
    }

    /// Handlers currently registered on this user's channel.
    pub fn handler_count(&self, event: &str) -> usize {
        self.channel.registry.handler_count(event)
    }

    /// Releases the lease explicitly.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for ChannelLease {
    fn drop(&mut self) {
        self.hub.release(&self.user_id);
    }
}
