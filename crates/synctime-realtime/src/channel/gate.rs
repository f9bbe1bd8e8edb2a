//! Delivery gate: lets a handler be closed only once no delivery to it is
//! still running.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

#[derive(Debug)]
struct GateState {
    open: bool,
    /// Threads currently inside the handler.
    running: Vec<ThreadId>,
}

/// Per-handler gate shared by the registry and the subscription guard.
#[derive(Debug)]
pub(crate) struct DeliveryGate {
    state: Mutex<GateState>,
    idle: Condvar,
}

/// Held for the duration of one handler call.
pub(crate) struct Delivery<'a> {
    gate: &'a DeliveryGate,
    thread: ThreadId,
}

impl DeliveryGate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                open: true,
                running: Vec::new(),
            }),
            idle: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Starts a delivery, or returns `None` once the gate is closed.
    pub(crate) fn enter(&self) -> Option<Delivery<'_>> {
        let mut state = self.lock();
        if !state.open {
            return None;
        }
        let thread = thread::current().id();
        state.running.push(thread);
        Some(Delivery { gate: self, thread })
    }

    /// Closes the gate and blocks until deliveries on other threads return.
    ///
    /// A delivery running on the calling thread is not waited for, so a
    /// handler may close its own gate.
    pub(crate) fn close(&self) {
        let me = thread::current().id();
        let mut state = self.lock();
        state.open = false;
        while state.running.iter().any(|t| *t != me) {
            state = self
                .idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Drop for Delivery<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.lock();
        if let Some(pos) = state.running.iter().position(|t| *t == self.thread) {
            state.running.swap_remove(pos);
        }
        drop(state);
        self.gate.idle.notify_all();
    }
}
