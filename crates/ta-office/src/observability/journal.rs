//! In-memory journal of actor state transitions.
//!
//! Every transition a student or the helper makes is appended here with a
//! strictly increasing sequence number. The journal is what the capacity,
//! single-consultation and signal-matching properties are checked against.

use crate::types::{Actor, StudentId};
use std::sync::{Mutex, PoisonError};
use tokio::time::Instant;

/// Kind of transition recorded in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Student finished its arrival delay.
    Arrived,
    /// Student found every chair taken and left.
    Rejected { occupied: usize },
    /// Student reserved a chair; `occupied` includes it.
    Seated { occupied: usize },
    /// Student sent `presence`.
    PresenceAnnounced,
    /// Student received `accepted` and left the waiting room.
    Accepted,
    /// Student received `finished`.
    Finished,
    /// Student left the office after consulting.
    Departed,
    /// Student gave its chair back because the office closed before it was
    /// accepted; `occupied` is the count after leaving.
    Abandoned { occupied: usize },
    /// Helper is waiting for `presence`.
    HelperIdle,
    /// Helper consumed `presence` and sent `accepted`.
    HelperAccepted,
    /// Helper started the service action.
    HelperServing { service_ms: u64 },
    /// Helper sent `finished`.
    HelperFinished,
    /// Helper left its loop after host cancellation.
    HelperStopped,
}

/// One journal entry.
#[derive(Debug, Clone, Copy)]
pub struct OfficeEvent {
    /// Position in the journal, starting at 0.
    pub seq: u64,
    pub actor: Actor,
    pub kind: EventKind,
    pub at: Instant,
}

/// Append-only event log shared by every actor in one office.
#[derive(Debug, Default)]
pub struct Journal {
    events: Mutex<Vec<OfficeEvent>>,
}

impl Journal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number.
    pub fn record(&self, actor: Actor, kind: EventKind) -> u64 {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = events.len() as u64;
        events.push(OfficeEvent {
            seq,
            actor,
            kind,
            at: Instant::now(),
        });
        seq
    }

    /// Copy of every event in sequence order.
    #[must_use]
    pub fn events(&self) -> Vec<OfficeEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events produced by one student, in sequence order.
    #[must_use]
    pub fn for_student(&self, id: StudentId) -> Vec<OfficeEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.actor == Actor::Student(id))
            .copied()
            .collect()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
