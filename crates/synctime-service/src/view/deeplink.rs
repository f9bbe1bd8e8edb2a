//! Resolves where activating a notification should navigate.
//!
//! Note notifications need a lookup chain (note, then its routine, then the
//! routine's day) before the calendar can be opened at the right place.
//! Every other entity navigates to the record's own link.

use std::fmt;
use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use tracing::{debug, warn};

use synctime_api::CalendarLookup;
use synctime_core::error::AppError;
use synctime_core::result::AppResult;
use synctime_core::types::id::NoteId;
use synctime_entity::NotificationRecord;

use crate::flash::{FlashMessage, FlashSink};

/// Default listing route of the notes feature.
pub const NOTES_ROUTE: &str = "/notes";

/// Everything but RFC 3986 unreserved characters.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub(crate) const NOTE_LINK_FAILED: &str = "Não foi possível abrir a nota";

/// A client route plus its query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationTarget {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl NavigationTarget {
    /// A bare route.
    pub fn route(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// `path?k=v&...`, with keys and values percent-encoded.
    pub fn to_href(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, QUERY_COMPONENT),
                    utf8_percent_encode(v, QUERY_COMPONENT)
                )
            })
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_href())
    }
}

/// Whether an entity tag names the note category.
pub fn is_note_entity(entity: &str) -> bool {
    let entity = entity.trim();
    entity.eq_ignore_ascii_case("nota") || entity.eq_ignore_ascii_case("note")
}

/// Deep-link resolver.
pub struct DeepLinkResolver {
    calendar: Arc<dyn CalendarLookup>,
    flash: Arc<dyn FlashSink>,
}

impl fmt::Debug for DeepLinkResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepLinkResolver").finish_non_exhaustive()
    }
}

impl DeepLinkResolver {
    pub fn new(calendar: Arc<dyn CalendarLookup>, flash: Arc<dyn FlashSink>) -> Self {
        Self { calendar, flash }
    }

    /// Resolves the target for a record. Never fails: a broken note chain
    /// falls back to [`NOTES_ROUTE`] with one error flash.
    pub async fn resolve(&self, record: &NotificationRecord) -> NavigationTarget {
        match self.lookup(record).await {
            Ok(target) => target,
            Err(_) => {
                self.flash.flash(FlashMessage::error(NOTE_LINK_FAILED));
                NavigationTarget::route(NOTES_ROUTE)
            }
        }
    }

    /// Resolves without flashing. Only a note chain can fail.
    pub(crate) async fn lookup(&self, record: &NotificationRecord) -> AppResult<NavigationTarget> {
        if !is_note_entity(&record.entity) {
            return Ok(NavigationTarget::route(record.link.as_deref().unwrap_or("/")));
        }

        match self.note_target(record).await {
            Ok(target) => {
                debug!(id = %record.id, target = %target, "Resolved note deep link");
                Ok(target)
            }
            Err(e) => {
                warn!(id = %record.id, error = %e, "Note deep link failed; falling back");
                Err(e)
            }
        }
    }

    async fn note_target(&self, record: &NotificationRecord) -> AppResult<NavigationTarget> {
        let note_id = record
            .id_entity
            .as_ref()
            .filter(|id| !id.is_empty())
            .map(|id| NoteId::new(id.as_str()))
            .ok_or_else(|| AppError::validation("Notification does not reference a note"))?;

        let note = self.calendar.note(&note_id).await?;
        let routine_id = note
            .parent_routine()
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Note '{note_id}' has no routine")))?;

        let routine = self.calendar.routine(&routine_id).await?;
        let day = routine
            .day()
            .ok_or_else(|| AppError::not_found(format!("Routine '{routine_id}' has no date")))?;

        Ok(NavigationTarget::route(NOTES_ROUTE)
            .with("date", day.format("%Y-%m-%d").to_string())
            .with("routineId", routine_id.as_str())
            .with("noteId", note_id.as_str())
            .with("openNotes", "true"))
    }
}
