//! Session context: explicit sign-in and sign-out lifecycle for the
//! notification engine.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::info;

use synctime_api::{CalendarLookup, NotificationRemote};
use synctime_core::error::AppError;
use synctime_core::result::AppResult;
use synctime_core::types::id::UserId;
use synctime_realtime::{ChannelHub, ChannelState};

use super::feed::NotificationFeed;
use super::memorized::MemorizedFilter;
use crate::flash::FlashSink;
use crate::notification::service::NotificationService;
use crate::notification::store::NotificationStore;
use crate::view::badge::BadgeCounter;
use crate::view::deeplink::DeepLinkResolver;
use crate::view::dropdown::DropdownPanel;

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct SessionDeps {
    pub notifications: Arc<dyn NotificationRemote>,
    pub calendar: Arc<dyn CalendarLookup>,
    pub hub: ChannelHub,
    pub flash: Arc<dyn FlashSink>,
    /// Confirm fetched unread notifications as read on every load.
    pub mark_read_on_load: bool,
}

/// State owned by one signed-in user.
pub struct Session {
    user_id: UserId,
    hub: ChannelHub,
    service: Arc<NotificationService>,
    badge: Arc<BadgeCounter>,
    dropdown: Arc<DropdownPanel>,
    feed: Mutex<Option<NotificationFeed>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("records", &self.service.store().len())
            .field("badge", &self.badge.view())
            .finish()
    }
}

impl Session {
    fn open(deps: &SessionDeps, user_id: UserId) -> AppResult<Self> {
        let store = NotificationStore::new();
        let service = Arc::new(NotificationService::new(
            user_id.clone(),
            Arc::clone(&deps.notifications),
            store,
            Arc::clone(&deps.flash),
            deps.mark_read_on_load,
        ));
        let badge = Arc::new(BadgeCounter::new(
            Arc::clone(&deps.notifications),
            Arc::clone(&deps.flash),
        ));
        let links = Arc::new(DeepLinkResolver::new(
            Arc::clone(&deps.calendar),
            Arc::clone(&deps.flash),
        ));
        let dropdown = Arc::new(DropdownPanel::new(
            Arc::clone(&service),
            Arc::clone(&badge),
            links,
        ));
        let feed = NotificationFeed::mount(
            &deps.hub,
            &user_id,
            Arc::clone(&service),
            Arc::clone(&badge),
        )?;

        Ok(Self {
            user_id,
            hub: deps.hub.clone(),
            service,
            badge,
            dropdown,
            feed: Mutex::new(Some(feed)),
        })
    }

    fn feed(&self) -> MutexGuard<'_, Option<NotificationFeed>> {
        self.feed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn store(&self) -> &NotificationStore {
        self.service.store()
    }

    pub fn service(&self) -> &Arc<NotificationService> {
        &self.service
    }

    pub fn badge(&self) -> &Arc<BadgeCounter> {
        &self.badge
    }

    pub fn dropdown(&self) -> &Arc<DropdownPanel> {
        &self.dropdown
    }

    /// Seeds the badge count and the store. Failures are flashed and the
    /// session stays usable.
    pub async fn start(&self) {
        let _ = tokio::join!(self.badge.refresh(), self.service.load());
    }

    /// Mounts an additional push consumer on this user's channel.
    pub fn mount_feed(&self) -> AppResult<NotificationFeed> {
        if !self.is_live() {
            return Err(AppError::channel("Session is closed"));
        }
        NotificationFeed::mount(
            &self.hub,
            &self.user_id,
            Arc::clone(&self.service),
            Arc::clone(&self.badge),
        )
    }

    /// Push channel state as seen by the session's feed.
    pub fn watch_channel(&self) -> Option<watch::Receiver<ChannelState>> {
        self.feed().as_ref().map(NotificationFeed::watch_channel)
    }

    /// Whether the session's own feed is still mounted.
    pub fn is_live(&self) -> bool {
        self.feed().is_some()
    }

    /// Unmounts the session's feed. Idempotent.
    pub fn close(&self) {
        let feed = self.feed().take();
        if let Some(feed) = feed {
            feed.unmount();
            info!(user_id = %self.user_id, "Session closed");
        }
    }
}

/// Holds the current session, if anyone is signed in.
pub struct SessionContext {
    deps: SessionDeps,
    current: Mutex<Option<Arc<Session>>>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("current", &self.current())
            .finish()
    }
}

impl SessionContext {
    pub fn new(deps: SessionDeps) -> Self {
        Self {
            deps,
            current: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<Session>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The signed-in session.
    pub fn current(&self) -> Option<Arc<Session>> {
        self.slot().clone()
    }

    /// Signs `user_id` in, replacing any other user's session.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn sign_in(&self, user_id: UserId) -> AppResult<Arc<Session>> {
        if user_id.is_empty() {
            return Err(AppError::authentication("Cannot sign in without a user id"));
        }

        let mut slot = self.slot();
        if let Some(existing) = slot.take() {
            if existing.user_id == user_id && existing.is_live() {
                *slot = Some(Arc::clone(&existing));
                return Ok(existing);
            }
            existing.close();
        }

        let session = Arc::new(Session::open(&self.deps, user_id)?);
        info!(user_id = %session.user_id, "Signed in");
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Signs in whoever the memorized-filter blob names.
    pub async fn sign_in_from(&self, path: impl AsRef<Path>) -> AppResult<Arc<Session>> {
        let blob = MemorizedFilter::load(path).await?;
        self.sign_in(blob.id)
    }

    /// Tears the current session down. Returns `false` if nobody was
    /// signed in.
    pub fn sign_out(&self) -> bool {
        let session = self.slot().take();
        match session {
            Some(session) => {
                session.close();
                info!(user_id = %session.user_id, "Signed out");
                true
            }
            None => false,
        }
    }
}
