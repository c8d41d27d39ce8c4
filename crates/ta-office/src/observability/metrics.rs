//! Metrics definitions for the office simulation.
//!
//! All metrics follow Prometheus naming conventions:
//! - `ta_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `outcome`: 2 values (admitted, rejected)
//! - `signal`: 3 values (presence, accepted, finished)
//! - `error_type`: bounded by `OfficeError::error_type`

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus recorder with an HTTP listener on `addr`.
///
/// Must be called from within a tokio runtime, before any metrics are
/// recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        // Consultations run for seconds, not milliseconds
        .set_buckets_for_metric(
            Matcher::Prefix("ta_consultation".to_string()),
            &[0.010, 0.100, 0.500, 1.000, 2.000, 3.000, 5.000, 10.000],
        )
        .map_err(|e| format!("Failed to set consultation buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("ta_waiting_room".to_string()),
            &[0.001, 0.010, 0.100, 0.500, 1.000, 2.500, 5.000, 10.000, 30.000],
        )
        .map_err(|e| format!("Failed to set waiting room buckets: {e}"))?
        .install()
        .map_err(|e| format!("Failed to install Prometheus metrics recorder: {e}"))
}

// ============================================================================
// Waiting Room
// ============================================================================

/// Set the number of occupied waiting-room chairs.
///
/// Metric: `ta_waiting_room_occupied`
pub fn set_waiting_room_occupied(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("ta_waiting_room_occupied").set(count as f64);
}

/// Record an admission decision.
///
/// Metric: `ta_admissions_total`
/// Labels: `outcome` (admitted, rejected)
pub fn record_admission(outcome: &'static str) {
    counter!("ta_admissions_total", "outcome" => outcome).increment(1);
}

/// Record how long a student sat in the waiting room before acceptance.
///
/// Metric: `ta_waiting_room_wait_seconds`
pub fn record_waiting_room_wait(duration: Duration) {
    histogram!("ta_waiting_room_wait_seconds").record(duration.as_secs_f64());
}

// ============================================================================
// Rendezvous
// ============================================================================

/// Record a rendezvous signal being sent.
///
/// Metric: `ta_rendezvous_signals_total`
/// Labels: `signal` (presence, accepted, finished)
pub fn record_signal(signal: &'static str) {
    counter!("ta_rendezvous_signals_total", "signal" => signal).increment(1);
}

/// Set the number of students currently consulting with the helper.
///
/// Metric: `ta_consultations_active`
pub fn set_consultations_active(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("ta_consultations_active").set(count as f64);
}

/// Record the service time of one consultation, as chosen by the helper.
///
/// Metric: `ta_consultation_duration_seconds`
pub fn record_consultation_duration(duration: Duration) {
    histogram!("ta_consultation_duration_seconds").record(duration.as_secs_f64());
}

// ============================================================================
// Failures
// ============================================================================

/// Record a student task that ended in an error.
///
/// Metric: `ta_student_failures_total`
/// Labels: `error_type`
pub fn record_student_failure(error_type: &'static str) {
    counter!("ta_student_failures_total", "error_type" => error_type).increment(1);
}
