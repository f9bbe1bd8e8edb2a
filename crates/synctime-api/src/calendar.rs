//! HTTP implementation of [`CalendarLookup`].

use async_trait::async_trait;

use synctime_core::result::AppResult;
use synctime_core::types::id::{NoteId, RoutineId};
use synctime_entity::{Note, Routine};

use crate::client::ApiClient;
use crate::traits::CalendarLookup;

/// Note and routine endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCalendarApi {
    client: ApiClient,
}

impl HttpCalendarApi {
    /// Creates a new calendar API client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CalendarLookup for HttpCalendarApi {
    async fn note(&self, id: &NoteId) -> AppResult<Note> {
        self.client.get_json(&format!("/note/{id}")).await
    }

    async fn routine(&self, id: &RoutineId) -> AppResult<Routine> {
        self.client.get_json(&format!("/routine/{id}")).await
    }
}
