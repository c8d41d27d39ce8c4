//! `StudentActor` - one arriving student.
//!
//! ```text
//! ArrivingAfterDelay → AttemptingAdmission ─┬─▶ RejectedDeparted
//!                                           └─▶ Seated → AnnouncingPresence
//!   → AwaitingAcceptance → Consulting → AwaitingFinish → Departed
//! ```
//!
//! A student runs this sequence once. Rejection is final: there is no retry.
//! The chair is given back at acceptance, before the consultation starts.

use crate::errors::OfficeError;
use crate::observability::EventKind;
use crate::office::{Office, Reservation, WaitingRoom};
use crate::timing::{DelayRange, DelaySource};
use crate::types::{Actor, StudentId};

use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Student lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentState {
    ArrivingAfterDelay,
    AttemptingAdmission,
    RejectedDeparted,
    Seated,
    AnnouncingPresence,
    AwaitingAcceptance,
    Consulting,
    AwaitingFinish,
    Departed,
}

impl StudentState {
    /// `true` for the two states a student never leaves.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, StudentState::RejectedDeparted | StudentState::Departed)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            StudentState::ArrivingAfterDelay => "arriving_after_delay",
            StudentState::AttemptingAdmission => "attempting_admission",
            StudentState::RejectedDeparted => "rejected_departed",
            StudentState::Seated => "seated",
            StudentState::AnnouncingPresence => "announcing_presence",
            StudentState::AwaitingAcceptance => "awaiting_acceptance",
            StudentState::Consulting => "consulting",
            StudentState::AwaitingFinish => "awaiting_finish",
            StudentState::Departed => "departed",
        }
    }
}

impl fmt::Display for StudentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a student's visit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentOutcome {
    /// No chair was free on arrival.
    Rejected,
    /// Consulted with the helper and left.
    Served,
}

/// One student actor.
pub struct StudentActor {
    id: StudentId,
    office: Arc<Office>,
    delays: Arc<dyn DelaySource>,
    arrival: DelayRange,
    state: StudentState,
}

impl StudentActor {
    /// Create a student that has not arrived yet.
    #[must_use]
    pub fn new(
        id: StudentId,
        office: Arc<Office>,
        delays: Arc<dyn DelaySource>,
        arrival: DelayRange,
    ) -> Self {
        Self {
            id,
            office,
            delays,
            arrival,
            state: StudentState::ArrivingAfterDelay,
        }
    }

    #[must_use]
    pub fn id(&self) -> StudentId {
        self.id
    }

    /// Run the student as its own task.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<Result<StudentOutcome, OfficeError>> {
        tokio::spawn(self.run())
    }

    fn transition(&mut self, next: StudentState) {
        debug!(
            target: "ta.actor.student",
            student_id = %self.id,
            from = %self.state,
            to = %next,
            "Student state transition"
        );
        self.state = next;
    }

    fn record(&self, kind: EventKind) {
        self.office.journal().record(Actor::Student(self.id), kind);
    }

    /// Give back the reservation of a student that cannot continue.
    ///
    /// Any slot token must already be released.
    fn abandon(&self, room: &WaitingRoom, err: OfficeError) -> OfficeError {
        let occupied = room.leave_room();
        self.record(EventKind::Abandoned { occupied });
        warn!(
            target: "ta.actor.student",
            student_id = %self.id,
            state = %self.state,
            occupied,
            error = %err,
            "Student gave up its chair"
        );
        err
    }

    /// Run the full visit: arrive, try for a chair, consult, leave.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::OfficeClosed` if the office closes while this
    /// student is waiting on a chair or a signal. A student that fails before
    /// acceptance has already given its chair back.
    #[instrument(skip_all, name = "ta.actor.student", fields(student_id = %self.id))]
    pub async fn run(mut self) -> Result<StudentOutcome, OfficeError> {
        let arrival_delay = self.delays.sample(self.arrival);
        tokio::time::sleep(arrival_delay).await;

        info!(
            target: "ta.actor.student",
            student_id = %self.id,
            arrival_delay_ms = arrival_delay.as_millis(),
            "Student arrived at the office"
        );
        self.record(EventKind::Arrived);
        self.transition(StudentState::AttemptingAdmission);

        let office = Arc::clone(&self.office);
        let room = office.room();
        let channel = office.channel();

        let occupied = match room.try_reserve_slot() {
            Reservation::Reserved { occupied } => occupied,
            Reservation::Rejected { occupied } => {
                self.transition(StudentState::RejectedDeparted);
                self.record(EventKind::Rejected { occupied });
                info!(
                    target: "ta.actor.student",
                    student_id = %self.id,
                    occupied,
                    capacity = room.capacity(),
                    "No chairs available, student leaves"
                );
                return Ok(StudentOutcome::Rejected);
            }
        };

        self.transition(StudentState::Seated);
        self.record(EventKind::Seated { occupied });
        let token = match room.acquire_slot_token().await {
            Ok(token) => token,
            Err(e) => return Err(self.abandon(room, e)),
        };
        let seated_at = Instant::now();
        info!(
            target: "ta.actor.student",
            student_id = %self.id,
            occupied,
            capacity = room.capacity(),
            "Student took a chair"
        );

        self.transition(StudentState::AnnouncingPresence);
        channel.announce_presence();
        office.metrics().record_presence();
        self.record(EventKind::PresenceAnnounced);
        info!(
            target: "ta.actor.student",
            student_id = %self.id,
            "Student told the helper they are ready"
        );

        self.transition(StudentState::AwaitingAcceptance);
        if let Err(e) = channel.await_acceptance().await {
            room.release_slot_token(token);
            return Err(self.abandon(room, e));
        }

        // No await between here and await_finish: on the current-thread
        // runtime the student is queued on `finished` before anyone else can
        // be accepted.
        self.record(EventKind::Accepted);
        room.release_slot_token(token);
        let occupied = room.leave_room();
        office.metrics().record_student_consulting(seated_at.elapsed());
        self.transition(StudentState::Consulting);
        info!(
            target: "ta.actor.student",
            student_id = %self.id,
            occupied,
            "Student left the chair and is consulting with the helper"
        );

        self.transition(StudentState::AwaitingFinish);
        channel.await_finish().await?;
        self.record(EventKind::Finished);
        office.metrics().record_student_served();

        self.transition(StudentState::Departed);
        self.record(EventKind::Departed);
        info!(
            target: "ta.actor.student",
            student_id = %self.id,
            "Consultation finished, student leaves the office"
        );

        Ok(StudentOutcome::Served)
    }
}

impl fmt::Debug for StudentActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudentActor")
            .field("id", &self.id)
            .field("arrival", &self.arrival)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::office::SignalKind;
    use crate::timing::FixedDelay;
    use std::time::Duration;

    fn student(id: u32, office: &Arc<Office>) -> StudentActor {
        StudentActor::new(
            StudentId(id),
            Arc::clone(office),
            Arc::new(FixedDelay::zero()),
            DelayRange::zero(),
        )
    }

    fn kinds(office: &Office, id: u32) -> Vec<EventKind> {
        office
            .journal()
            .for_student(StudentId(id))
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_terminal_states() {
        assert!(StudentState::RejectedDeparted.is_terminal());
        assert!(StudentState::Departed.is_terminal());
        assert!(!StudentState::Seated.is_terminal());
        assert!(!StudentState::AwaitingFinish.is_terminal());
    }

    #[tokio::test]
    async fn test_student_rejected_when_room_full() {
        let office = Office::new(1).unwrap();
        assert!(office.room().try_reserve_slot().is_reserved());

        let outcome = student(1, &office).run().await.unwrap();

        assert_eq!(outcome, StudentOutcome::Rejected);
        assert_eq!(
            kinds(&office, 1),
            vec![EventKind::Arrived, EventKind::Rejected { occupied: 1 }]
        );
        // A rejected student never signals the helper
        assert_eq!(office.channel().pending(SignalKind::Presence), 0);
        assert_eq!(office.metrics().snapshot().presence_announced, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_student_full_handshake_with_manual_helper() {
        let office = Office::new(2).unwrap();
        let task = student(7, &office).spawn();

        // Helper side, driven by hand
        office.channel().await_presence().await.unwrap();
        assert_eq!(office.room().occupied(), 1);
        assert_eq!(office.room().available_tokens(), 1);

        office.channel().accept();
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Accepted: the chair is already free while consulting
        assert_eq!(office.room().occupied(), 0);
        assert_eq!(office.room().available_tokens(), 2);
        assert!(!task.is_finished());

        office.channel().finish();
        let outcome = task.await.unwrap().unwrap();

        assert_eq!(outcome, StudentOutcome::Served);
        assert_eq!(
            kinds(&office, 7),
            vec![
                EventKind::Arrived,
                EventKind::Seated { occupied: 1 },
                EventKind::PresenceAnnounced,
                EventKind::Accepted,
                EventKind::Finished,
                EventKind::Departed,
            ]
        );
        let snapshot = office.metrics().snapshot();
        assert_eq!(snapshot.served, 1);
        assert_eq!(snapshot.consulting, 0);
        assert_eq!(snapshot.peak_consulting, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_student_waits_for_arrival_delay() {
        let office = Office::new(1).unwrap();
        let actor = StudentActor::new(
            StudentId(1),
            Arc::clone(&office),
            Arc::new(FixedDelay(Duration::from_secs(2))),
            DelayRange::new(0, 2000),
        );
        let task = actor.spawn();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(office.journal().is_empty());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(kinds(&office, 1).first(), Some(&EventKind::Arrived));

        office.close();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(OfficeError::OfficeClosed("accepted"))));

        // The chair and the reservation are both given back
        assert_eq!(office.room().occupied(), 0);
        assert_eq!(office.room().available_tokens(), 1);
        assert_eq!(office.metrics().snapshot().seated, 0);
        assert_eq!(
            kinds(&office, 1).last(),
            Some(&EventKind::Abandoned { occupied: 0 })
        );
    }

    #[tokio::test]
    async fn test_closed_office_fails_seated_student() {
        let office = Office::new(1).unwrap();
        office.close();

        let result = student(3, &office).run().await;

        assert!(matches!(result, Err(OfficeError::OfficeClosed("waiting room"))));
        assert_eq!(
            kinds(&office, 3),
            vec![
                EventKind::Arrived,
                EventKind::Seated { occupied: 1 },
                EventKind::Abandoned { occupied: 0 },
            ]
        );
        assert_eq!(office.room().occupied(), 0);
    }

    #[tokio::test]
    async fn test_failed_student_does_not_block_later_admissions() {
        let office = Office::new(1).unwrap();
        office.close();

        assert!(student(1, &office).run().await.is_err());
        let second = student(2, &office).run().await;

        // Rejection would mean the first student's reservation leaked
        assert!(matches!(second, Err(OfficeError::OfficeClosed("waiting room"))));
        assert_eq!(
            kinds(&office, 2).get(1),
            Some(&EventKind::Seated { occupied: 1 })
        );
        assert_eq!(office.metrics().snapshot().rejected, 0);
    }

    #[test]
    fn test_debug_output() {
        let office = Office::new(1).unwrap();
        let debug = format!("{:?}", student(5, &office));
        assert!(debug.contains("StudentId(5)"));
        assert!(debug.contains("ArrivingAfterDelay"));
    }
}
