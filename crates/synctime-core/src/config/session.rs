//! Signed-in session configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionConfig {
    /// Path of the per-user memorized-filter blob (JSON, carries `id`).
    #[serde(default = "default_memorized_filter_path")]
    #[validate(length(min = 1))]
    pub memorized_filter_path: String,
    /// Confirm every fetched unread notification as read on the server
    /// right after a full list load. The local copy keeps the fetched flags.
    #[serde(default = "default_true")]
    pub mark_read_on_load: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            memorized_filter_path: default_memorized_filter_path(),
            mark_read_on_load: true,
        }
    }
}

fn default_memorized_filter_path() -> String {
    "data/memorized-filter.json".to_string()
}

fn default_true() -> bool {
    true
}
