//! Routine model: one day of a user's calendar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use synctime_core::types::id::RoutineId;

/// A routine. Only its id and day are used here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    /// Routine identifier.
    pub id: RoutineId,
    /// Day of the routine as sent by the server (date or timestamp).
    #[serde(default)]
    pub date: Option<String>,
}

impl Routine {
    /// The calendar day, if the server sent a parseable one.
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(crate::timestamp::parse_day)
    }
}
