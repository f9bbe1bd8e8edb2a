//! Scripted API collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Notify;

use synctime_api::{CalendarLookup, NotificationRemote};
use synctime_core::error::AppError;
use synctime_core::result::AppResult;
use synctime_core::types::id::{EntityId, NoteId, NotificationId, RoutineId, UserId};
use synctime_entity::{Note, NotificationRecord, Routine};

/// Fixed clock used by every test.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
}

pub fn record(id: u64, read: bool, entity: &str) -> NotificationRecord {
    NotificationRecord {
        id: NotificationId::from(id),
        text: format!("Notificação {id}"),
        created_at: now() - Duration::minutes(id as i64),
        read,
        entity: entity.to_string(),
        id_entity: None,
        link: None,
        type_of_action: None,
    }
}

pub fn note_record(id: u64, note: &str) -> NotificationRecord {
    NotificationRecord {
        id_entity: Some(EntityId::from(note)),
        link: Some("/notes".to_string()),
        ..record(id, false, "Nota")
    }
}

pub fn id(n: u64) -> NotificationId {
    NotificationId::from(n)
}

/// Blocks one call until released.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// Notification API double with switchable failures.
#[derive(Default)]
pub struct MockRemote {
    pub records: Mutex<Vec<NotificationRecord>>,
    pub unseen: AtomicU64,
    pub fail_list: AtomicBool,
    pub fail_mark_read: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_count: AtomicBool,
    pub fail_seen: AtomicBool,
    pub mark_read_gate: Mutex<Option<Arc<Gate>>>,
    pub count_gate: Mutex<Option<Arc<Gate>>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockRemote {
    pub fn with_records(records: Vec<NotificationRecord>) -> Arc<Self> {
        let mock = Self::default();
        *mock.records.lock().unwrap() = records;
        Arc::new(mock)
    }

    pub fn set_records(&self, records: Vec<NotificationRecord>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(flag: &AtomicBool, op: &str) -> AppResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(AppError::network(format!("{op}: connection reset")))
        } else {
            Ok(())
        }
    }
}

fn join(ids: &[NotificationId]) -> String {
    ids.iter().map(|i| i.as_str()).collect::<Vec<_>>().join(",")
}

#[async_trait]
impl NotificationRemote for MockRemote {
    async fn list(&self, user_id: &UserId) -> AppResult<Vec<NotificationRecord>> {
        self.log(format!("list:{user_id}"));
        Self::check(&self.fail_list, "list")?;
        Ok(self.records.lock().unwrap().clone())
    }

    async fn get(&self, id: &NotificationId) -> AppResult<NotificationRecord> {
        self.log(format!("get:{id}"));
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("no such notification"))
    }

    async fn mark_read(&self, ids: &[NotificationId]) -> AppResult<()> {
        self.log(format!("mark_read:{}", join(ids)));
        let gate = self.mark_read_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Self::check(&self.fail_mark_read, "mark_read")
    }

    async fn delete(&self, ids: &[NotificationId]) -> AppResult<()> {
        self.log(format!("delete:{}", join(ids)));
        Self::check(&self.fail_delete, "delete")
    }

    async fn unseen_count(&self) -> AppResult<u64> {
        self.log("unseen_count".to_string());
        let unseen = self.unseen.load(Ordering::SeqCst);
        let gate = self.count_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Self::check(&self.fail_count, "count")?;
        Ok(unseen)
    }

    async fn mark_all_seen(&self) -> AppResult<()> {
        self.log("mark_all_seen".to_string());
        Self::check(&self.fail_seen, "seen")?;
        self.unseen.store(0, Ordering::SeqCst);
        Ok(())
    }
}

/// Calendar double keyed by id.
#[derive(Default)]
pub struct MockCalendar {
    pub notes: HashMap<String, Note>,
    pub routines: HashMap<String, Routine>,
    pub calls: Mutex<Vec<String>>,
}

impl MockCalendar {
    pub fn with_note(mut self, note: &str, routine: &str) -> Self {
        self.notes.insert(
            note.to_string(),
            Note {
                id: NoteId::from(note),
                routine_id: Some(RoutineId::from(routine)),
                routine: None,
            },
        );
        self
    }

    pub fn with_routine(mut self, routine: &str, date: &str) -> Self {
        self.routines.insert(
            routine.to_string(),
            Routine {
                id: RoutineId::from(routine),
                date: Some(date.to_string()),
            },
        );
        self
    }
}

#[async_trait]
impl CalendarLookup for MockCalendar {
    async fn note(&self, id: &NoteId) -> AppResult<Note> {
        self.calls.lock().unwrap().push(format!("note:{id}"));
        self.notes
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("note {id}")))
    }

    async fn routine(&self, id: &RoutineId) -> AppResult<Routine> {
        self.calls.lock().unwrap().push(format!("routine:{id}"));
        self.routines
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| AppError::external_service(format!("routine {id}")))
    }
}
