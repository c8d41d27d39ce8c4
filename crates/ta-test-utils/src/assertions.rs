//! Journal assertions for expressive tests
//!
//! Each check replays the recorded events of a run and panics with the
//! offending event when the office protocol was violated.
//!
//! # Example
//! ```rust,ignore
//! office.journal().events()
//!     .assert_capacity_respected(5)
//!     .assert_consultations_serialized()
//!     .assert_handshakes_complete();
//! ```

use std::collections::BTreeMap;

use ta_office::observability::{EventKind, OfficeEvent};
use ta_office::office::{Office, SignalKind};
use ta_office::types::{Actor, StudentId};

/// Protocol checks over a sequence of office events.
pub trait JournalAssertions {
    /// No more than `capacity` students are ever seated at once.
    fn assert_capacity_respected(&self, capacity: usize) -> &Self;

    /// At most one student is between `Accepted` and `Finished` at any time.
    fn assert_consultations_serialized(&self) -> &Self;

    /// Every presence announcement is followed by exactly one acceptance and
    /// one finish for the same student, in that order.
    fn assert_handshakes_complete(&self) -> &Self;

    /// A rejected student produces nothing after its rejection.
    fn assert_rejected_never_announce(&self) -> &Self;

    /// Students `1..=students` each end in `Rejected`, `Departed` or
    /// `Abandoned`.
    fn assert_all_terminal(&self, students: u32) -> &Self;
}

fn by_student(events: &[OfficeEvent]) -> BTreeMap<StudentId, Vec<EventKind>> {
    let mut grouped: BTreeMap<StudentId, Vec<EventKind>> = BTreeMap::new();
    for event in events {
        if let Actor::Student(id) = event.actor {
            grouped.entry(id).or_default().push(event.kind);
        }
    }
    grouped
}

impl JournalAssertions for [OfficeEvent] {
    fn assert_capacity_respected(&self, capacity: usize) -> &Self {
        let mut seated = 0usize;
        for event in self {
            match event.kind {
                EventKind::Seated { occupied } => {
                    seated += 1;
                    assert!(
                        occupied <= capacity,
                        "occupied {occupied} exceeds capacity {capacity} at {event:?}"
                    );
                }
                EventKind::Accepted | EventKind::Abandoned { .. } => {
                    seated = seated
                        .checked_sub(1)
                        .unwrap_or_else(|| panic!("chair vacated without a seat at {event:?}"));
                }
                _ => {}
            }
            assert!(
                seated <= capacity,
                "{seated} students seated with capacity {capacity} at {event:?}"
            );
        }
        self
    }

    fn assert_consultations_serialized(&self) -> &Self {
        let mut consulting: Option<StudentId> = None;
        for event in self {
            let Actor::Student(id) = event.actor else {
                continue;
            };
            match event.kind {
                EventKind::Accepted => {
                    assert!(
                        consulting.is_none(),
                        "student {id} accepted while student {} is consulting at {event:?}",
                        consulting.map_or(0, StudentId::get)
                    );
                    consulting = Some(id);
                }
                EventKind::Finished => {
                    assert!(
                        consulting.is_some(),
                        "student {id} finished without a consultation at {event:?}"
                    );
                    consulting = None;
                }
                _ => {}
            }
        }
        self
    }

    fn assert_handshakes_complete(&self) -> &Self {
        for (id, kinds) in by_student(self) {
            let Some(presence) = kinds.iter().position(|k| *k == EventKind::PresenceAnnounced)
            else {
                continue;
            };
            let after = kinds.get(presence + 1..).unwrap_or_default();
            let accepted = after.iter().filter(|k| **k == EventKind::Accepted).count();
            let finished = after.iter().filter(|k| **k == EventKind::Finished).count();
            assert_eq!(accepted, 1, "student {id} accepted {accepted} times: {kinds:?}");
            assert_eq!(finished, 1, "student {id} finished {finished} times: {kinds:?}");

            let accepted_at = after.iter().position(|k| *k == EventKind::Accepted);
            let finished_at = after.iter().position(|k| *k == EventKind::Finished);
            assert!(
                accepted_at < finished_at,
                "student {id} finished before being accepted: {kinds:?}"
            );
        }
        self
    }

    fn assert_rejected_never_announce(&self) -> &Self {
        for (id, kinds) in by_student(self) {
            if let Some(rejected) = kinds
                .iter()
                .position(|k| matches!(k, EventKind::Rejected { .. }))
            {
                assert_eq!(
                    rejected + 1,
                    kinds.len(),
                    "rejected student {id} kept going: {kinds:?}"
                );
                assert!(
                    !kinds.contains(&EventKind::PresenceAnnounced),
                    "rejected student {id} announced presence: {kinds:?}"
                );
            }
        }
        self
    }

    fn assert_all_terminal(&self, students: u32) -> &Self {
        let grouped = by_student(self);
        for id in (1..=students).map(StudentId) {
            let last = grouped.get(&id).and_then(|kinds| kinds.last());
            assert!(
                matches!(
                    last,
                    Some(
                        EventKind::Rejected { .. }
                            | EventKind::Departed
                            | EventKind::Abandoned { .. }
                    )
                ),
                "student {id} did not reach a terminal state, last event {last:?}"
            );
        }
        self
    }
}

/// Checks on the office state left behind by a finished run.
pub trait OfficeAssertions {
    /// No `accepted` or `finished` unit was left unconsumed, and the helper
    /// consumed every `presence`.
    fn assert_no_pending_signals(&self) -> &Self;

    /// Nobody holds a reservation or a chair.
    fn assert_room_empty(&self) -> &Self;
}

impl OfficeAssertions for Office {
    fn assert_no_pending_signals(&self) -> &Self {
        for kind in [SignalKind::Presence, SignalKind::Accepted, SignalKind::Finished] {
            let pending = self.channel().pending(kind);
            assert_eq!(
                pending,
                0,
                "{pending} unconsumed '{}' units left after the run",
                kind.as_str()
            );
        }
        self
    }

    fn assert_room_empty(&self) -> &Self {
        let room = self.room();
        assert_eq!(room.occupied(), 0, "reservations leaked after the run");
        assert_eq!(
            room.available_tokens(),
            room.capacity(),
            "chairs still held after the run"
        );
        assert_eq!(
            self.metrics().snapshot().seated,
            0,
            "seated counter not back to zero"
        );
        self
    }
}
