//! JSON serialization for channel frames.

use synctime_core::error::AppError;
use synctime_core::types::id::UserId;

use super::types::{AuthRequest, ChannelFrame, EVENT_AUTH, InboundMessage};
use super::validator::validate_inbound;

/// Serialize a frame to its JSON text form.
pub fn serialize_frame(frame: &ChannelFrame) -> Result<String, AppError> {
    Ok(serde_json::to_string(frame)?)
}

/// Build the `auth` handshake frame for a user.
pub fn auth_frame(user_id: &UserId) -> Result<String, AppError> {
    let data = serde_json::to_value(AuthRequest {
        user_id: user_id.clone(),
    })?;
    serialize_frame(&ChannelFrame::new(EVENT_AUTH, data))
}

/// Validate and decode an inbound text frame.
pub fn deserialize_inbound(raw: &str, max_bytes: usize) -> Result<InboundMessage, AppError> {
    validate_inbound(raw, max_bytes)?;
    let frame: ChannelFrame = serde_json::from_str(raw)?;
    if frame.event.trim().is_empty() {
        return Err(AppError::validation("Frame has an empty event name"));
    }
    Ok(frame.into())
}
