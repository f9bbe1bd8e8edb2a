//! Remote collaborator traits consumed by the notification engine.

use async_trait::async_trait;

use synctime_core::result::AppResult;
use synctime_core::types::id::{NoteId, NotificationId, RoutineId, UserId};
use synctime_entity::{Note, NotificationRecord, Routine};

/// Notification endpoints of the SyncTime API.
#[async_trait]
pub trait NotificationRemote: Send + Sync + 'static {
    /// Fetch every notification of the user, newest first.
    async fn list(&self, user_id: &UserId) -> AppResult<Vec<NotificationRecord>>;

    /// Fetch one notification.
    async fn get(&self, id: &NotificationId) -> AppResult<NotificationRecord>;

    /// Mark notifications as read (inbox dimension).
    async fn mark_read(&self, ids: &[NotificationId]) -> AppResult<()>;

    /// Delete notifications.
    async fn delete(&self, ids: &[NotificationId]) -> AppResult<()>;

    /// Number of notifications not yet seen for badge purposes.
    async fn unseen_count(&self) -> AppResult<u64>;

    /// Mark every notification as seen (badge dimension).
    async fn mark_all_seen(&self) -> AppResult<()>;
}

/// Calendar lookups needed to resolve note deep links.
#[async_trait]
pub trait CalendarLookup: Send + Sync + 'static {
    /// Fetch a note.
    async fn note(&self, id: &NoteId) -> AppResult<Note>;

    /// Fetch a routine.
    async fn routine(&self, id: &RoutineId) -> AppResult<Routine>;
}
