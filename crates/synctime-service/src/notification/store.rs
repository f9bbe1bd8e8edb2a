//! In-memory notification store for one signed-in session.
//!
//! Records are kept newest first with set semantics on `id`. Each record
//! remembers the sequence number of the last local mutation that touched it,
//! which lets a failed optimistic update be rolled back without clobbering a
//! later action on the same record.
//!
//! Locking is short and synchronous so push handlers running on the channel
//! task can ingest without awaiting.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::debug;

use synctime_core::types::filter::{StatusFilter, TypeFilter};
use synctime_core::types::id::NotificationId;
use synctime_entity::NotificationRecord;

use super::projection::{self, Counts};

/// A record plus the sequence of the last mutation applied to it.
#[derive(Debug, Clone)]
struct Entry {
    record: NotificationRecord,
    seq: u64,
}

#[derive(Debug, Default)]
struct StoreState {
    entries: Vec<Entry>,
    ids: HashSet<NotificationId>,
    next_seq: u64,
}

impl StoreState {
    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn records(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.entries.iter().map(|e| &e.record)
    }
}

/// Receipt for an optimistic mark-read, used to roll it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMark {
    seq: u64,
    ids: Vec<NotificationId>,
}

impl ReadMark {
    /// Records whose flag this mark flipped.
    pub fn ids(&self) -> &[NotificationId] {
        &self.ids
    }
}

/// Shared, cloneable handle to the session's notifications.
#[derive(Debug, Clone)]
pub struct NotificationStore {
    state: Arc<RwLock<StoreState>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            revision: Arc::new(revision),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn changed(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Replaces the whole set with a fetched list, keeping the first
    /// occurrence of any repeated id. Returns the resulting length.
    pub fn replace(&self, records: Vec<NotificationRecord>) -> usize {
        let len = {
            let mut state = self.write();
            let seq = state.bump();
            let mut ids = HashSet::with_capacity(records.len());
            let mut entries = Vec::with_capacity(records.len());
            for record in records {
                if ids.insert(record.id.clone()) {
                    entries.push(Entry { record, seq });
                } else {
                    debug!(id = %record.id, "Dropping repeated id in fetched list");
                }
            }
            state.entries = entries;
            state.ids = ids;
            state.entries.len()
        };
        self.changed();
        len
    }

    /// Inserts a record at the head. A known id is dropped and `false`
    /// returned.
    pub fn ingest(&self, record: NotificationRecord) -> bool {
        {
            let mut state = self.write();
            if state.ids.contains(&record.id) {
                debug!(id = %record.id, "Duplicate notification ignored");
                return false;
            }
            let seq = state.bump();
            state.ids.insert(record.id.clone());
            state.entries.insert(0, Entry { record, seq });
        }
        self.changed();
        true
    }

    /// Optimistically marks records read.
    ///
    /// Returns `None` when nothing changed (unknown ids or already read).
    pub fn mark_read(&self, ids: &[NotificationId]) -> Option<ReadMark> {
        let mark = {
            let mut state = self.write();
            let seq = state.bump();
            let mut flipped = Vec::new();
            for entry in state.entries.iter_mut() {
                if !entry.record.read && ids.contains(&entry.record.id) {
                    entry.record.read = true;
                    entry.seq = seq;
                    flipped.push(entry.record.id.clone());
                }
            }
            if flipped.is_empty() {
                return None;
            }
            ReadMark { seq, ids: flipped }
        };
        self.changed();
        Some(mark)
    }

    /// Undoes a mark-read on every record no later mutation has touched.
    /// Returns how many records were reverted.
    pub fn revert_read(&self, mark: &ReadMark) -> usize {
        let reverted = {
            let mut state = self.write();
            let mut reverted = 0;
            for entry in state.entries.iter_mut() {
                if entry.seq == mark.seq && mark.ids.contains(&entry.record.id) {
                    entry.record.read = false;
                    reverted += 1;
                }
            }
            reverted
        };
        if reverted > 0 {
            self.changed();
        }
        reverted
    }

    /// Removes one record.
    pub fn remove(&self, id: &NotificationId) -> bool {
        self.remove_many(std::slice::from_ref(id)) == 1
    }

    /// Removes every listed record and returns how many were present.
    pub fn remove_many(&self, ids: &[NotificationId]) -> usize {
        let removed = {
            let mut state = self.write();
            let before = state.entries.len();
            state.entries.retain(|e| !ids.contains(&e.record.id));
            for id in ids {
                state.ids.remove(id);
            }
            before - state.entries.len()
        };
        if removed > 0 {
            self.changed();
        }
        removed
    }

    /// Counters under a type facet.
    pub fn counts(&self, type_filter: &TypeFilter) -> Counts {
        projection::counts(self.read().records(), type_filter)
    }

    /// Records passing both facets, newest first.
    pub fn filtered(&self, status: StatusFilter, type_filter: &TypeFilter) -> Vec<NotificationRecord> {
        projection::filtered(self.read().records(), status, type_filter)
    }

    /// Read records under the type facet, the target of "clear read".
    pub fn read_ids_for(&self, type_filter: &TypeFilter) -> Vec<NotificationId> {
        projection::clearable_ids(self.read().records(), type_filter)
    }

    /// Type-filter options derived from the full set.
    pub fn type_facets(&self) -> Vec<TypeFilter> {
        projection::type_facets(self.read().records())
    }

    /// Looks up one record.
    pub fn get(&self, id: &NotificationId) -> Option<NotificationRecord> {
        self.read().records().find(|r| &r.id == id).cloned()
    }

    /// Every record, newest first.
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.read().records().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Current revision. Increases on every change.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
