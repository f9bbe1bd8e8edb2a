//! # synctime-realtime
//!
//! Client side of the SyncTime push channel. Provides:
//!
//! - One authenticated, reconnecting connection per signed-in user
//! - Reference-counted channel lifetime through [`ChannelLease`]
//! - Fan-out event subscriptions with exactly-once deregistration
//! - A pluggable [`connection::transport::Transport`] (WebSocket or in-memory)

pub mod channel;
pub mod connection;
pub mod hub;
pub mod message;

pub use channel::state::ChannelState;
pub use channel::subscription::Subscription;
pub use hub::{ChannelHub, ChannelLease};
pub use message::types::{EVENT_AUTH, EVENT_AUTH_ERROR, EVENT_AUTH_SUCCESS, EVENT_NEW_NOTIFICATION};
