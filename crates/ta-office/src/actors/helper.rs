//! `HelperActor` - the single teaching assistant.
//!
//! ```text
//! Idle ──presence──▶ Accepting ──accepted sent──▶ Serving ──finished sent──▶ Idle
//! ```
//!
//! The helper has no terminal state of its own. It serves students one at a
//! time until its host cancels it. Cancellation is only observed while idle,
//! so a consultation that has started always finishes. On exit the helper
//! closes the office so no student can wait on it forever.

use crate::errors::OfficeError;
use crate::observability::EventKind;
use crate::office::Office;
use crate::timing::{DelayRange, DelaySource};
use crate::types::Actor;

use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Helper lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperState {
    /// Waiting for a student to announce presence.
    Idle,
    /// Calling the student in and choosing a service time.
    Accepting,
    /// Helping the student.
    Serving,
}

impl HelperState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            HelperState::Idle => "idle",
            HelperState::Accepting => "accepting",
            HelperState::Serving => "serving",
        }
    }
}

impl fmt::Display for HelperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a running `HelperActor`.
pub struct HelperHandle {
    task: JoinHandle<u64>,
    cancel_token: CancellationToken,
}

impl HelperHandle {
    /// Ask the helper to stop once it is idle.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// `true` once the helper loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the helper and wait for it to exit.
    ///
    /// Returns the number of consultations the helper completed.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::Internal` if the helper task panicked.
    pub async fn shutdown(self) -> Result<u64, OfficeError> {
        self.cancel_token.cancel();
        self.task
            .await
            .map_err(|e| OfficeError::Internal(format!("helper task failed: {e}")))
    }
}

impl fmt::Debug for HelperHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperHandle")
            .field("cancelled", &self.cancel_token.is_cancelled())
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

/// The helper actor.
pub struct HelperActor {
    office: Arc<Office>,
    delays: Arc<dyn DelaySource>,
    service: DelayRange,
    cancel_token: CancellationToken,
    state: HelperState,
    consultations: u64,
}

impl HelperActor {
    /// Spawn the helper loop and return a handle to it.
    ///
    /// `cancel_token` is the host's stop signal; pass a child token to tie
    /// the helper to a wider shutdown.
    #[must_use]
    pub fn spawn(
        office: Arc<Office>,
        delays: Arc<dyn DelaySource>,
        service: DelayRange,
        cancel_token: CancellationToken,
    ) -> HelperHandle {
        let actor = Self {
            office,
            delays,
            service,
            cancel_token: cancel_token.clone(),
            state: HelperState::Idle,
            consultations: 0,
        };

        HelperHandle {
            task: tokio::spawn(actor.run()),
            cancel_token,
        }
    }

    fn transition(&mut self, next: HelperState) {
        debug!(
            target: "ta.actor.helper",
            from = %self.state,
            to = %next,
            "Helper state transition"
        );
        self.state = next;
    }

    fn record(&self, kind: EventKind) {
        self.office.journal().record(Actor::Helper, kind);
    }

    #[instrument(skip_all, name = "ta.actor.helper")]
    async fn run(mut self) -> u64 {
        info!(
            target: "ta.actor.helper",
            capacity = self.office.room().capacity(),
            "Helper: office hours started, ready for students"
        );

        let office = Arc::clone(&self.office);
        let channel = office.channel();

        loop {
            self.transition(HelperState::Idle);
            self.record(EventKind::HelperIdle);
            debug!(
                target: "ta.actor.helper",
                "Helper checking for students or going to sleep"
            );

            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "ta.actor.helper",
                        consultations = self.consultations,
                        "Helper received cancellation signal"
                    );
                    break;
                }

                result = channel.await_presence() => {
                    if let Err(e) = result {
                        warn!(
                            target: "ta.actor.helper",
                            error = %e,
                            "Helper stopped waiting for students"
                        );
                        break;
                    }
                }
            }

            self.transition(HelperState::Accepting);
            info!(
                target: "ta.actor.helper",
                "Helper: a student is present, calling them in"
            );
            channel.accept();
            self.record(EventKind::HelperAccepted);

            let service = self.delays.sample(self.service);
            office.metrics().record_consultation_started(service);

            self.transition(HelperState::Serving);
            let service_ms = u64::try_from(service.as_millis()).unwrap_or(u64::MAX);
            self.record(EventKind::HelperServing { service_ms });
            info!(
                target: "ta.actor.helper",
                service_ms,
                "Helper: helping a student"
            );
            tokio::time::sleep(service).await;

            channel.finish();
            office.metrics().record_consultation_finished();
            self.consultations += 1;
            self.record(EventKind::HelperFinished);
            info!(
                target: "ta.actor.helper",
                consultations = self.consultations,
                "Helper: finished helping the student"
            );
        }

        office.close();
        self.record(EventKind::HelperStopped);
        info!(
            target: "ta.actor.helper",
            consultations = self.consultations,
            "Helper stopped"
        );

        self.consultations
    }
}
