//! Simulation host.
//!
//! Builds the office, starts the helper and every student, waits for all
//! students to finish their visit, then stops the helper and reports.
//!
//! A run must happen on a current-thread runtime. The rendezvous signals
//! carry no student ID: a student that receives `accepted` reaches its
//! `finished` wait without yielding, which keeps consultations apart only
//! while no other actor can run in parallel. [`Simulation::run`] refuses
//! any other runtime flavor.

use crate::actors::{HelperActor, StudentActor, StudentOutcome};
use crate::errors::OfficeError;
use crate::office::Office;
use crate::timing::{DelayRange, DelaySource};
use crate::types::StudentId;

use serde::Serialize;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Parameters of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSettings {
    /// Identifier attached to logs and the report.
    pub run_id: String,
    /// Students launched.
    pub num_students: u32,
    /// Waiting room capacity.
    pub waiting_chairs: usize,
    /// Helper service time bounds.
    pub service: DelayRange,
    /// Student arrival delay bounds.
    pub arrival: DelayRange,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub run_id: String,
    pub num_students: u32,
    pub waiting_chairs: usize,
    pub admitted: u32,
    pub rejected: u32,
    pub served: u32,
    pub failed: u32,
    /// Consultations the helper completed.
    pub consultations: u64,
    pub peak_seated: usize,
    pub peak_consulting: usize,
    pub elapsed_ms: u64,
}

/// One office run.
pub struct Simulation {
    settings: SimulationSettings,
    delays: Arc<dyn DelaySource>,
    office: Arc<Office>,
    cancel_token: CancellationToken,
}

impl Simulation {
    /// Build the office for `settings`.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::InvalidCapacity` if the waiting room cannot be
    /// created. No actor has been started when this fails.
    pub fn new(
        settings: SimulationSettings,
        delays: Arc<dyn DelaySource>,
    ) -> Result<Self, OfficeError> {
        let office = Office::new(settings.waiting_chairs).map_err(|e| {
            error!(
                target: "ta.simulation",
                run_id = %settings.run_id,
                error = %e,
                "Failed to open the office"
            );
            e
        })?;

        Ok(Self {
            settings,
            delays,
            office,
            cancel_token: CancellationToken::new(),
        })
    }

    /// The shared office, for inspection while or after running.
    #[must_use]
    pub fn office(&self) -> &Arc<Office> {
        &self.office
    }

    /// Token that stops the helper; cancelling it early ends the run once
    /// the helper is idle.
    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    /// Run every student to completion and return the report.
    ///
    /// Student failures are logged and counted; they do not abort the run.
    ///
    /// # Errors
    ///
    /// Returns `OfficeError::UnsupportedRuntime` before starting any actor if
    /// called outside a current-thread runtime, and `OfficeError::Internal`
    /// if the helper task panicked.
    #[instrument(skip_all, name = "ta.simulation", fields(run_id = %self.settings.run_id))]
    pub async fn run(&self) -> Result<SimulationReport, OfficeError> {
        let flavor = Handle::current().runtime_flavor();
        if flavor != RuntimeFlavor::CurrentThread {
            error!(
                target: "ta.simulation",
                flavor = ?flavor,
                "Simulation requires a current-thread runtime"
            );
            return Err(OfficeError::UnsupportedRuntime(format!("{flavor:?}")));
        }

        let started_at = Instant::now();

        info!(
            target: "ta.simulation",
            num_students = self.settings.num_students,
            waiting_chairs = self.settings.waiting_chairs,
            service_min_ms = self.settings.service.min_ms,
            service_max_ms = self.settings.service.max_ms,
            "Starting office simulation"
        );

        let helper = HelperActor::spawn(
            Arc::clone(&self.office),
            Arc::clone(&self.delays),
            self.settings.service,
            self.cancel_token.child_token(),
        );

        let students: Vec<_> = (1..=self.settings.num_students)
            .map(|id| {
                let actor = StudentActor::new(
                    StudentId(id),
                    Arc::clone(&self.office),
                    Arc::clone(&self.delays),
                    self.settings.arrival,
                );
                (actor.id(), actor.spawn())
            })
            .collect();

        for (id, task) in students {
            let failure = match task.await {
                Ok(Ok(StudentOutcome::Served | StudentOutcome::Rejected)) => None,
                Ok(Err(e)) => Some(e),
                Err(join_err) => Some(OfficeError::StudentTask {
                    student_id: id.get(),
                    reason: join_err.to_string(),
                }),
            };

            if let Some(e) = failure {
                warn!(
                    target: "ta.simulation",
                    student_id = %id,
                    error = %e,
                    error_type = e.error_type(),
                    "Student task failed"
                );
                self.office.metrics().record_student_failed(e.error_type());
            }
        }

        info!(
            target: "ta.simulation",
            "All students processed"
        );

        let consultations = helper.shutdown().await?;
        let snapshot = self.office.metrics().snapshot();

        let report = SimulationReport {
            run_id: self.settings.run_id.clone(),
            num_students: self.settings.num_students,
            waiting_chairs: self.settings.waiting_chairs,
            admitted: snapshot.admitted,
            rejected: snapshot.rejected,
            served: snapshot.served,
            failed: snapshot.failed,
            consultations,
            peak_seated: snapshot.peak_seated,
            peak_consulting: snapshot.peak_consulting,
            elapsed_ms: u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            target: "ta.simulation",
            admitted = report.admitted,
            rejected = report.rejected,
            served = report.served,
            failed = report.failed,
            consultations = report.consultations,
            elapsed_ms = report.elapsed_ms,
            "Office simulation complete"
        );

        Ok(report)
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("settings", &self.settings)
            .field("office", &self.office)
            .finish_non_exhaustive()
    }
}
