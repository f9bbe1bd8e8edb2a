//! Inbound frame validation rules.

use synctime_core::error::AppError;

/// Validates the raw text of an inbound frame before decoding.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty frame"));
    }

    Ok(())
}

/// Validates an event name used for subscriptions.
pub fn validate_event_name(event: &str) -> Result<(), AppError> {
    if event.is_empty() || event.len() > 128 {
        return Err(AppError::validation("Invalid event name length"));
    }

    if !event
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ':' || c == '-' || c == '_' || c == '.')
    {
        return Err(AppError::validation("Event name contains invalid characters"));
    }

    Ok(())
}
