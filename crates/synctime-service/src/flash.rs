//! User-visible flash messages.
//!
//! Remote failures never propagate into the views as errors; they are
//! turned into a flash at the operation boundary. The sink is a seam so the
//! agent can log them and the CLI can print them.

use std::sync::Mutex;

use serde::Serialize;
use tracing::{error, info};

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    /// Severity.
    pub level: FlashLevel,
    /// Text shown to the user.
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            text: text.into(),
        }
    }
}

/// Destination for flash messages.
pub trait FlashSink: Send + Sync + 'static {
    /// Shows a message.
    fn flash(&self, message: FlashMessage);
}

/// Sink that logs every message and keeps it until drained.
#[derive(Debug, Default)]
pub struct FlashLog {
    messages: Mutex<Vec<FlashMessage>>,
}

impl FlashLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages shown so far, oldest first.
    pub fn messages(&self) -> Vec<FlashMessage> {
        self.lock().clone()
    }

    /// Takes every pending message.
    pub fn drain(&self) -> Vec<FlashMessage> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of error messages shown so far.
    pub fn error_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|m| m.level == FlashLevel::Error)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<FlashMessage>> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl FlashSink for FlashLog {
    fn flash(&self, message: FlashMessage) {
        match message.level {
            FlashLevel::Success => info!(text = %message.text, "Flash"),
            FlashLevel::Error => error!(text = %message.text, "Flash"),
        }
        self.lock().push(message);
    }
}
