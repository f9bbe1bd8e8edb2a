//! Payload of the `newNotification` push event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use synctime_core::types::id::{EntityId, NotificationId};

use super::model::{NotificationRecord, null_as_default};

/// A notification delivered over the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushNotification {
    /// Notification identifier.
    pub id: NotificationId,
    /// Title.
    #[serde(alias = "text")]
    pub title: String,
    /// Creation instant; defaults to arrival time when the server omits it.
    #[serde(
        default = "Utc::now",
        deserialize_with = "crate::timestamp::deserialize"
    )]
    pub created_at: DateTime<Utc>,
    /// Domain object category.
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity: String,
    /// Referenced domain object.
    #[serde(default)]
    pub id_entity: Option<EntityId>,
    /// Client route.
    #[serde(default, alias = "link")]
    pub path: Option<String>,
    /// Action that produced the event.
    #[serde(default)]
    pub type_of_action: Option<String>,
    /// Absolute unseen count, when the server sends one.
    #[serde(default)]
    pub count: Option<u64>,
    /// Unseen increment carried by this event.
    #[serde(default)]
    pub delta: Option<u64>,
}

impl PushNotification {
    /// Increment to apply to the badge when no absolute count is present.
    pub fn unseen_delta(&self) -> u64 {
        self.delta.unwrap_or(1)
    }

    /// Convert into an unread inbox record.
    pub fn to_record(&self) -> NotificationRecord {
        NotificationRecord {
            id: self.id.clone(),
            text: self.title.clone(),
            created_at: self.created_at,
            read: false,
            entity: self.entity.clone(),
            id_entity: self.id_entity.clone(),
            link: self.path.clone(),
            type_of_action: self.type_of_action.clone(),
        }
    }
}
