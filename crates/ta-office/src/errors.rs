//! Office error types.
//!
//! A rejected admission is not an error: it is reported through
//! [`Reservation::Rejected`](crate::office::Reservation) and
//! [`StudentOutcome::Rejected`](crate::actors::StudentOutcome).
//! The variants here cover primitive setup failures (fatal) and per-student
//! task failures (logged, simulation continues).

use thiserror::Error;

/// Office error type.
///
/// Fatal variants abort the simulation before any actor runs:
/// - `InvalidCapacity`, `Config`, `Metrics`, `UnsupportedRuntime`
///
/// Non-fatal variants are scoped to one actor:
/// - `OfficeClosed`, `StudentTask`, `Internal`
#[derive(Debug, Error)]
pub enum OfficeError {
    /// Waiting room could not be created with the requested capacity.
    #[error("Invalid waiting room capacity: {0}")]
    InvalidCapacity(usize),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics recorder/exporter could not be installed.
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// The simulation was started on a runtime that can run two actors at
    /// the same instant. Pairing students with the helper relies on every
    /// actor sharing one thread.
    #[error("Unsupported runtime flavor: {0}")]
    UnsupportedRuntime(String),

    /// A wait was attempted on a signal or room that has been closed.
    #[error("Office closed while waiting on {0}")]
    OfficeClosed(&'static str),

    /// A student task failed (panicked, was cancelled, or returned an error).
    #[error("Student {student_id} failed: {reason}")]
    StudentTask { student_id: u32, reason: String },

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OfficeError {
    /// Returns `true` if this error must abort the simulation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            OfficeError::InvalidCapacity(_)
            | OfficeError::Config(_)
            | OfficeError::Metrics(_)
            | OfficeError::UnsupportedRuntime(_) => true,
            OfficeError::OfficeClosed(_)
            | OfficeError::StudentTask { .. }
            | OfficeError::Internal(_) => false,
        }
    }

    /// Returns a bounded label for metrics and structured logs.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            OfficeError::InvalidCapacity(_) => "invalid_capacity",
            OfficeError::Config(_) => "config",
            OfficeError::Metrics(_) => "metrics",
            OfficeError::UnsupportedRuntime(_) => "unsupported_runtime",
            OfficeError::OfficeClosed(_) => "office_closed",
            OfficeError::StudentTask { .. } => "student_task",
            OfficeError::Internal(_) => "internal",
        }
    }
}

impl From<crate::config::ConfigError> for OfficeError {
    fn from(err: crate::config::ConfigError) -> Self {
        OfficeError::Config(err.to_string())
    }
}
