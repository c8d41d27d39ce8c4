//! Shared office counters.
//!
//! `OfficeMetrics` is shared between the waiting room, both actor kinds and
//! the simulation report. All fields are atomic for lock-free access. Each
//! update is also forwarded to the `metrics` facade so an installed
//! Prometheus exporter sees the same values.

use crate::observability::metrics as prom;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Lock-free counters describing one office run.
#[derive(Debug, Default)]
pub struct OfficeMetrics {
    students_admitted: AtomicU32,
    students_rejected: AtomicU32,
    students_served: AtomicU32,
    students_failed: AtomicU32,
    presence_announced: AtomicU64,
    consultations_started: AtomicU64,
    consultations_finished: AtomicU64,
    seated: AtomicUsize,
    peak_seated: AtomicUsize,
    consulting: AtomicUsize,
    peak_consulting: AtomicUsize,
}

/// Snapshot of office metrics at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfficeMetricsSnapshot {
    /// Students whose reservation succeeded.
    pub admitted: u32,
    /// Students turned away because every chair was taken.
    pub rejected: u32,
    /// Students who received their `finished` signal.
    pub served: u32,
    /// Students whose task ended in an error.
    pub failed: u32,
    /// `presence` signals sent by students.
    pub presence_announced: u64,
    /// `accepted` signals sent by the helper.
    pub consultations_started: u64,
    /// `finished` signals sent by the helper.
    pub consultations_finished: u64,
    /// Chairs occupied right now.
    pub seated: usize,
    /// Highest chair occupancy observed.
    pub peak_seated: usize,
    /// Students between `accepted` and `finished` right now.
    pub consulting: usize,
    /// Highest number of simultaneous consultations observed.
    pub peak_consulting: usize,
}

/// Raise `peak` to `value` if it is larger.
fn raise_peak(peak: &AtomicUsize, value: usize) {
    let mut current = peak.load(Ordering::SeqCst);
    while value > current {
        match peak.compare_exchange_weak(current, value, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => break,
            Err(actual) => current = actual,
        }
    }
}

impl OfficeMetrics {
    /// Create a new shared metrics instance.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a successful reservation; `occupied` is the count after it.
    pub fn record_admitted(&self, occupied: usize) {
        self.students_admitted.fetch_add(1, Ordering::SeqCst);
        self.seated.store(occupied, Ordering::SeqCst);
        raise_peak(&self.peak_seated, occupied);
        prom::record_admission("admitted");
        prom::set_waiting_room_occupied(occupied);
    }

    /// Record a rejected reservation.
    pub fn record_rejected(&self) {
        self.students_rejected.fetch_add(1, Ordering::SeqCst);
        prom::record_admission("rejected");
    }

    /// Record a student leaving the waiting room; `occupied` is the count after it.
    pub fn record_vacated(&self, occupied: usize) {
        self.seated.store(occupied, Ordering::SeqCst);
        prom::set_waiting_room_occupied(occupied);
    }

    /// Record a student announcing presence to the helper.
    pub fn record_presence(&self) {
        self.presence_announced.fetch_add(1, Ordering::SeqCst);
        prom::record_signal("presence");
    }

    /// Record the helper accepting a student.
    pub fn record_consultation_started(&self, service: Duration) {
        self.consultations_started.fetch_add(1, Ordering::SeqCst);
        prom::record_signal("accepted");
        prom::record_consultation_duration(service);
    }

    /// Record the helper finishing a consultation.
    pub fn record_consultation_finished(&self) {
        self.consultations_finished.fetch_add(1, Ordering::SeqCst);
        prom::record_signal("finished");
    }

    /// Record a student receiving `accepted` after `waited` in the room.
    pub fn record_student_consulting(&self, waited: Duration) {
        let now = self.consulting.fetch_add(1, Ordering::SeqCst) + 1;
        raise_peak(&self.peak_consulting, now);
        prom::set_consultations_active(now);
        prom::record_waiting_room_wait(waited);
    }

    /// Record a student receiving `finished`.
    pub fn record_student_served(&self) {
        let now = self
            .consulting
            .fetch_sub(1, Ordering::SeqCst)
            .saturating_sub(1);
        self.students_served.fetch_add(1, Ordering::SeqCst);
        prom::set_consultations_active(now);
    }

    /// Record a student task that ended in an error.
    pub fn record_student_failed(&self, error_type: &'static str) {
        self.students_failed.fetch_add(1, Ordering::SeqCst);
        prom::record_student_failure(error_type);
    }

    /// Take a snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> OfficeMetricsSnapshot {
        OfficeMetricsSnapshot {
            admitted: self.students_admitted.load(Ordering::SeqCst),
            rejected: self.students_rejected.load(Ordering::SeqCst),
            served: self.students_served.load(Ordering::SeqCst),
            failed: self.students_failed.load(Ordering::SeqCst),
            presence_announced: self.presence_announced.load(Ordering::SeqCst),
            consultations_started: self.consultations_started.load(Ordering::SeqCst),
            consultations_finished: self.consultations_finished.load(Ordering::SeqCst),
            seated: self.seated.load(Ordering::SeqCst),
            peak_seated: self.peak_seated.load(Ordering::SeqCst),
            consulting: self.consulting.load(Ordering::SeqCst),
            peak_consulting: self.peak_consulting.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let metrics = OfficeMetrics::new();
        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.admitted, 0);
        assert_eq!(snapshot.rejected, 0);
        assert_eq!(snapshot.served, 0);
        assert_eq!(snapshot.peak_seated, 0);
        assert_eq!(snapshot.peak_consulting, 0);
    }

    #[test]
    fn test_peak_seated_tracks_maximum() {
        let metrics = OfficeMetrics::new();

        metrics.record_admitted(1);
        metrics.record_admitted(2);
        metrics.record_admitted(3);
        metrics.record_vacated(2);
        metrics.record_admitted(3);
        metrics.record_vacated(0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.admitted, 4);
        assert_eq!(snapshot.seated, 0);
        assert_eq!(snapshot.peak_seated, 3);
    }

    #[test]
    fn test_consulting_counter_and_peak() {
        let metrics = OfficeMetrics::new();

        metrics.record_student_consulting(Duration::from_millis(5));
        metrics.record_student_served();
        metrics.record_student_consulting(Duration::from_millis(5));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.consulting, 1);
        assert_eq!(snapshot.peak_consulting, 1);
        assert_eq!(snapshot.served, 1);
    }

    #[test]
    fn test_helper_and_student_signal_counts() {
        let metrics = OfficeMetrics::new();

        metrics.record_presence();
        metrics.record_presence();
        metrics.record_consultation_started(Duration::from_secs(1));
        metrics.record_consultation_finished();
        metrics.record_rejected();
        metrics.record_student_failed("office_closed");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.presence_announced, 2);
        assert_eq!(snapshot.consultations_started, 1);
        assert_eq!(snapshot.consultations_finished, 1);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.failed, 1);
    }

    #[test]
    fn test_concurrent_peak_updates() {
        let metrics = OfficeMetrics::new();

        let handles: Vec<_> = (1..=8)
            .map(|n| {
                let m = Arc::clone(&metrics);
                std::thread::spawn(move || m.record_admitted(n))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(metrics.snapshot().peak_seated, 8);
        assert_eq!(metrics.snapshot().admitted, 8);
    }
}
