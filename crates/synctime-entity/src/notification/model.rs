//! Notification record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use synctime_core::types::id::{EntityId, NotificationId};

/// One user-facing notification as held in the local inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Unique notification identifier, stable across fetch and push.
    pub id: NotificationId,
    /// Human-readable title.
    #[serde(alias = "title")]
    pub text: String,
    /// Server-issued creation instant.
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    /// Whether the user has read this notification.
    #[serde(default, alias = "isRead", deserialize_with = "null_as_default")]
    pub read: bool,
    /// Domain object category, e.g. `"Nota"` or `"Conta"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity: String,
    /// Identifier of the referenced domain object.
    #[serde(default)]
    pub id_entity: Option<EntityId>,
    /// Client route to open on activation.
    #[serde(default, alias = "path")]
    pub link: Option<String>,
    /// Action that produced the event, e.g. `"Creation"`.
    #[serde(default)]
    pub type_of_action: Option<String>,
}

impl NotificationRecord {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.read
    }
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_list_item() {
        let json = serde_json::json!({
            "id": 12,
            "title": "Relatório exportado",
            "createdAt": "2026-10-14T10:00:00.000Z",
            "isRead": true,
            "entity": "Report",
            "idEntity": 99,
            "path": "/reports",
            "typeOfAction": "Export"
        });

        let record: NotificationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.id.as_str(), "12");
        assert_eq!(record.text, "Relatório exportado");
        assert!(record.read);
        assert_eq!(record.id_entity, Some(EntityId::from("99")));
        assert_eq!(record.link.as_deref(), Some("/reports"));
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = serde_json::json!({
            "id": "a",
            "text": "Olá",
            "createdAt": "2026-10-14 10:00:00",
            "entity": null
        });

        let record: NotificationRecord = serde_json::from_value(json).unwrap();
        assert!(record.is_unread());
        assert_eq!(record.entity, "");
        assert!(record.link.is_none());
    }
}
