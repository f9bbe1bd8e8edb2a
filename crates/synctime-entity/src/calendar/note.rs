//! Calendar note model.

use serde::{Deserialize, Serialize};

use synctime_core::types::id::{NoteId, RoutineId};

/// Reference to a routine embedded in a note payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineRef {
    /// Routine identifier.
    pub id: RoutineId,
}

/// A calendar note. Only the fields needed to find its routine are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Note identifier.
    pub id: NoteId,
    /// Parent routine id, when sent flat.
    #[serde(default, alias = "routine_id", alias = "idRoutine")]
    pub routine_id: Option<RoutineId>,
    /// Parent routine, when sent nested.
    #[serde(default)]
    pub routine: Option<RoutineRef>,
}

impl Note {
    /// The routine this note belongs to, whichever shape the server used.
    pub fn parent_routine(&self) -> Option<&RoutineId> {
        self.routine_id
            .as_ref()
            .or(self.routine.as_ref().map(|r| &r.id))
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_and_nested_routine() {
        let flat: Note = serde_json::from_value(serde_json::json!({"id": 1, "routineId": 7})).unwrap();
        assert_eq!(flat.parent_routine(), Some(&RoutineId::from("7")));

        let nested: Note =
            serde_json::from_value(serde_json::json!({"id": 1, "routine": {"id": "r9"}})).unwrap();
        assert_eq!(nested.parent_routine(), Some(&RoutineId::from("r9")));

        let orphan: Note = serde_json::from_value(serde_json::json!({"id": 1})).unwrap();
        assert_eq!(orphan.parent_routine(), None);
    }
}
