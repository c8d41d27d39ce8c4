//! Observability for the office simulation.
//!
//! Two complementary records of a run:
//! - [`metrics`]: Prometheus-style counters, gauges and histograms emitted
//!   through the `metrics` facade (exported only when a recorder is installed)
//! - [`journal`]: an ordered in-memory log of every actor state transition
//!
//! Narration itself goes through `tracing` in each actor.
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `ta_waiting_room_occupied` | Gauge | none | Chairs currently taken |
//! | `ta_admissions_total` | Counter | `outcome` | Admitted vs rejected students |
//! | `ta_waiting_room_wait_seconds` | Histogram | none | Time seated before acceptance |
//! | `ta_rendezvous_signals_total` | Counter | `signal` | Handshake signals sent |
//! | `ta_consultations_active` | Gauge | none | Students with the helper (0 or 1) |
//! | `ta_consultation_duration_seconds` | Histogram | none | Helper service time |
//! | `ta_student_failures_total` | Counter | `error_type` | Failed student tasks |

pub mod journal;
pub mod metrics;

pub use journal::{EventKind, Journal, OfficeEvent};
pub use self::metrics::init_metrics_recorder;
