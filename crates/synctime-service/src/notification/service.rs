//! Notification operations that talk to the API and keep the store in step.

use std::sync::Arc;

use tracing::{info, warn};

use synctime_api::NotificationRemote;
use synctime_core::error::AppError;
use synctime_core::result::AppResult;
use synctime_core::types::filter::TypeFilter;
use synctime_core::types::id::{NotificationId, UserId};
use synctime_entity::PushNotification;

use super::store::NotificationStore;
use crate::flash::{FlashMessage, FlashSink};

pub(crate) const MARK_READ_FAILED: &str = "Não foi possível marcar a notificação como lida";

/// The only writer of a session's [`NotificationStore`].
pub struct NotificationService {
    user_id: UserId,
    remote: Arc<dyn NotificationRemote>,
    store: NotificationStore,
    flash: Arc<dyn FlashSink>,
    mark_read_on_load: bool,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("user_id", &self.user_id)
            .field("records", &self.store.len())
            .finish()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        user_id: UserId,
        remote: Arc<dyn NotificationRemote>,
        store: NotificationStore,
        flash: Arc<dyn FlashSink>,
        mark_read_on_load: bool,
    ) -> Self {
        Self {
            user_id,
            remote,
            store,
            flash,
            mark_read_on_load,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Read handle on the store.
    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    /// Fetches the full list and replaces the store.
    ///
    /// On failure the store is untouched and an error is flashed.
    pub async fn load(&self) -> AppResult<usize> {
        let records = match self.remote.list(&self.user_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "Failed to load notifications");
                self.flash
                    .flash(FlashMessage::error("Não foi possível carregar as notificações"));
                return Err(e);
            }
        };

        let unread: Vec<NotificationId> = records
            .iter()
            .filter(|r| r.is_unread())
            .map(|r| r.id.clone())
            .collect();
        let len = self.store.replace(records);
        info!(user_id = %self.user_id, records = len, unread = unread.len(), "Notifications loaded");

        if self.mark_read_on_load && !unread.is_empty() {
            // The server flag flips; the local copy shows this fetch as it was.
            if let Err(e) = self.remote.mark_read(&unread).await {
                warn!(user_id = %self.user_id, error = %e, "Failed to confirm fetched notifications as read");
            }
        }

        Ok(len)
    }

    /// Adds a pushed notification. Returns `false` for a known id.
    pub fn ingest(&self, push: &PushNotification) -> bool {
        self.store.ingest(push.to_record())
    }

    /// Marks one notification read, rolling back if the server refuses.
    pub async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        self.mark_read_or_revert(id).await.inspect_err(|_| {
            self.flash.flash(FlashMessage::error(MARK_READ_FAILED));
        })
    }

    /// Marks read optimistically and rolls back on failure without flashing.
    pub(crate) async fn mark_read_or_revert(&self, id: &NotificationId) -> AppResult<()> {
        let Some(mark) = self.store.mark_read(std::slice::from_ref(id)) else {
            return Ok(());
        };

        match self.remote.mark_read(mark.ids()).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let reverted = self.store.revert_read(&mark);
                warn!(%id, reverted, error = %e, "Mark read failed; rolled back");
                Err(e)
            }
        }
    }

    /// Shows a message through the session's flash sink.
    pub(crate) fn flash(&self, message: FlashMessage) {
        self.flash.flash(message);
    }

    /// Deletes one notification once the server confirms.
    pub async fn delete(&self, id: &NotificationId) -> AppResult<()> {
        if self.store.get(id).is_none() {
            return Err(AppError::not_found(format!("Notification '{id}' not found")));
        }

        if let Err(e) = self.remote.delete(std::slice::from_ref(id)).await {
            warn!(%id, error = %e, "Delete failed");
            self.flash
                .flash(FlashMessage::error("Não foi possível excluir a notificação"));
            return Err(e);
        }

        self.store.remove(id);
        info!(%id, "Notification deleted");
        Ok(())
    }

    /// Deletes every read notification under the type facet.
    pub async fn clear_read(&self, type_filter: &TypeFilter) -> AppResult<usize> {
        let ids = self.store.read_ids_for(type_filter);
        if ids.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.remote.delete(&ids).await {
            warn!(type_filter = %type_filter, count = ids.len(), error = %e, "Clear read failed");
            self.flash
                .flash(FlashMessage::error("Não foi possível limpar as notificações lidas"));
            return Err(e);
        }

        let removed = self.store.remove_many(&ids);
        info!(type_filter = %type_filter, removed, "Read notifications cleared");
        Ok(removed)
    }
}
