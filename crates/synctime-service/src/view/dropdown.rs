//! Dropdown panel listing the session's notifications.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use synctime_core::error::AppError;
use synctime_core::result::AppResult;
use synctime_core::types::filter::{StatusFilter, TypeFilter};
use synctime_core::types::id::NotificationId;
use synctime_entity::NotificationRecord;

use super::badge::BadgeCounter;
use super::badge::MARK_SEEN_FAILED;
use super::deeplink::{DeepLinkResolver, NOTE_LINK_FAILED, NOTES_ROUTE, NavigationTarget};
use crate::flash::FlashMessage;
use crate::notification::projection::Counts;
use crate::notification::relative_time::format_relative;
use crate::notification::service::{MARK_READ_FAILED, NotificationService};

/// One rendered line of the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRow {
    pub id: NotificationId,
    pub text: String,
    /// Relative label, e.g. "5 min atrás".
    pub when: String,
    pub read: bool,
    pub entity: String,
}

impl NotificationRow {
    fn project(record: &NotificationRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: record.id.clone(),
            text: record.text.clone(),
            when: format_relative(record.created_at, now),
            read: record.read,
            entity: record.entity.clone(),
        }
    }
}

/// Everything the panel renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownView {
    pub open: bool,
    /// Initial list fetch in flight.
    pub loading: bool,
    pub status: StatusFilter,
    pub type_filter: TypeFilter,
    pub rows: Vec<NotificationRow>,
    pub counts: Counts,
    pub facets: Vec<TypeFilter>,
}

#[derive(Debug, Default)]
struct PanelState {
    open: bool,
    loading: bool,
    status: StatusFilter,
    type_filter: TypeFilter,
}

/// Dropdown panel over the shared store.
#[derive(Debug)]
pub struct DropdownPanel {
    service: Arc<NotificationService>,
    badge: Arc<BadgeCounter>,
    links: Arc<DeepLinkResolver>,
    state: Mutex<PanelState>,
}

impl DropdownPanel {
    pub fn new(
        service: Arc<NotificationService>,
        badge: Arc<BadgeCounter>,
        links: Arc<DeepLinkResolver>,
    ) -> Self {
        Self {
            service,
            badge,
            links,
            state: Mutex::new(PanelState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }

    /// Opens the panel and fetches the list.
    pub async fn open(&self) -> AppResult<usize> {
        {
            let mut state = self.state();
            state.open = true;
            state.loading = true;
        }
        let loaded = self.service.load().await;
        self.state().loading = false;
        loaded
    }

    /// Closes the panel. The badge is marked seen on the way out.
    pub async fn close(&self) {
        if self.take_open() {
            // Failure is flashed by the badge; the panel closes regardless.
            let _ = self.badge.mark_seen().await;
        }
    }

    fn take_open(&self) -> bool {
        std::mem::replace(&mut self.state().open, false)
    }

    pub fn select_status(&self, status: StatusFilter) {
        self.state().status = status;
    }

    pub fn select_type(&self, type_filter: TypeFilter) {
        self.state().type_filter = type_filter;
    }

    /// Active type filter, reset to `All` once its entity has disappeared.
    fn active_type(&self, facets: &[TypeFilter]) -> TypeFilter {
        let mut state = self.state();
        if !facets.contains(&state.type_filter) {
            debug!(type_filter = %state.type_filter, "Type filter no longer present; using all");
            state.type_filter = TypeFilter::All;
        }
        state.type_filter.clone()
    }

    /// Projects the current store for rendering.
    pub fn view(&self, now: DateTime<Utc>) -> DropdownView {
        let store = self.service.store();
        let facets = store.type_facets();
        let type_filter = self.active_type(&facets);
        let (open, loading, status) = {
            let state = self.state();
            (state.open, state.loading, state.status)
        };

        let rows = store
            .filtered(status, &type_filter)
            .iter()
            .map(|r| NotificationRow::project(r, now))
            .collect();

        DropdownView {
            open,
            loading,
            status,
            counts: store.counts(&type_filter),
            type_filter,
            rows,
            facets,
        }
    }

    pub async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        self.service.mark_read(id).await
    }

    pub async fn delete(&self, id: &NotificationId) -> AppResult<()> {
        self.service.delete(id).await
    }

    /// Clears read notifications under the active type filter.
    pub async fn clear_read(&self) -> AppResult<usize> {
        let facets = self.service.store().type_facets();
        let type_filter = self.active_type(&facets);
        self.service.clear_read(&type_filter).await
    }

    /// Activates a row: marks it read, resolves its target, closes the panel.
    ///
    /// Navigation always happens. However many of the three remote calls
    /// fail, the gesture raises at most one error flash, naming the most
    /// visible failure: the link, then the read mark, then the badge.
    pub async fn activate(&self, id: &NotificationId) -> AppResult<NavigationTarget> {
        let record = self
            .service
            .store()
            .get(id)
            .ok_or_else(|| AppError::not_found(format!("Notification '{id}' not found")))?;

        let marked = if record.is_unread() {
            self.service.mark_read_or_revert(id).await
        } else {
            Ok(())
        };

        let (target, linked) = match self.links.lookup(&record).await {
            Ok(target) => (target, Ok(())),
            Err(e) => (NavigationTarget::route(NOTES_ROUTE), Err(e)),
        };

        let seen = if self.take_open() {
            self.badge.reset_seen().await
        } else {
            Ok(())
        };

        let failure = if linked.is_err() {
            Some(NOTE_LINK_FAILED)
        } else if marked.is_err() {
            Some(MARK_READ_FAILED)
        } else if seen.is_err() {
            Some(MARK_SEEN_FAILED)
        } else {
            None
        };
        if let Some(text) = failure {
            self.service.flash(FlashMessage::error(text));
        }

        Ok(target)
    }
}
