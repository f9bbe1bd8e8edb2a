//! Frame and message type definitions.
//!
//! Every frame on the wire is a JSON text message shaped
//! `{"event": "<name>", "data": <any json>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use synctime_core::types::id::UserId;

/// Outbound handshake event.
pub const EVENT_AUTH: &str = "auth";
/// Inbound handshake acknowledgement.
pub const EVENT_AUTH_SUCCESS: &str = "authSuccess";
/// Inbound handshake rejection.
pub const EVENT_AUTH_ERROR: &str = "authError";
/// Inbound new-notification event.
pub const EVENT_NEW_NOTIFICATION: &str = "newNotification";

/// One frame in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelFrame {
    /// Event name.
    pub event: String,
    /// Event payload, delivered verbatim to handlers.
    #[serde(default)]
    pub data: Value,
}

impl ChannelFrame {
    /// Creates a frame.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Body of the `auth` handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    /// Signed-in user.
    #[serde(rename = "userId")]
    pub user_id: UserId,
}

/// Inbound frames classified by how the channel reacts to them.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Handshake accepted.
    AuthSuccess,
    /// Handshake rejected, with the server's payload.
    AuthError(Value),
    /// Any other event, forwarded to subscribers.
    Event {
        /// Event name.
        name: String,
        /// Payload.
        data: Value,
    },
}

impl From<ChannelFrame> for InboundMessage {
    fn from(frame: ChannelFrame) -> Self {
        match frame.event.as_str() {
            EVENT_AUTH_SUCCESS => InboundMessage::AuthSuccess,
            EVENT_AUTH_ERROR => InboundMessage::AuthError(frame.data),
            _ => InboundMessage::Event {
                name: frame.event,
                data: frame.data,
            },
        }
    }
}

/// Human-readable reason out of an `authError` payload.
pub fn auth_error_reason(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| data.to_string()),
        Value::Null => "authentication rejected".to_string(),
        other => other.to_string(),
    }
}
