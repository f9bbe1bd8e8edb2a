//! REST API client configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for the SyncTime REST API client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing slash.
    #[validate(url)]
    pub base_url: String,
    /// Bearer token sent on every request. Usually injected through
    /// `SYNCTIME__API__TOKEN` rather than written to disk.
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    15
}
