//! Push channel configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Push channel (WebSocket) client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RealtimeConfig {
    /// WebSocket endpoint of the notification channel.
    #[validate(url)]
    pub url: String,
    /// How long to wait for `authSuccess`/`authError` after connecting.
    #[serde(default = "default_auth_timeout")]
    #[validate(range(min = 1, max = 120))]
    pub auth_timeout_seconds: u64,
    /// First reconnect delay in milliseconds.
    #[serde(default = "default_reconnect_initial")]
    #[validate(range(min = 10))]
    pub reconnect_initial_ms: u64,
    /// Upper bound for the reconnect delay in milliseconds.
    #[serde(default = "default_reconnect_max")]
    #[validate(range(min = 10))]
    pub reconnect_max_ms: u64,
    /// Growth factor applied to the delay after each failed attempt.
    #[serde(default = "default_reconnect_multiplier")]
    #[validate(range(min = 1.0, max = 10.0))]
    pub reconnect_multiplier: f64,
    /// Largest accepted inbound frame in bytes.
    #[serde(default = "default_max_frame_bytes")]
    #[validate(range(min = 1024))]
    pub max_frame_bytes: usize,
}

impl RealtimeConfig {
    /// Authentication acknowledgement timeout.
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_seconds)
    }
}

fn default_auth_timeout() -> u64 {
    10
}

fn default_reconnect_initial() -> u64 {
    500
}

fn default_reconnect_max() -> u64 {
    30_000
}

fn default_reconnect_multiplier() -> f64 {
    2.0
}

fn default_max_frame_bytes() -> usize {
    65_536
}
