//! Actors of the office.
//!
//! ```text
//! Simulation (host)
//! ├── owns the Office (waiting room + rendezvous channel)
//! ├── HelperActor (exactly one, cancelled by the host)
//! └── N StudentActors (one visit each, joined by the host)
//! ```
//!
//! # Key Design Decisions
//!
//! - **No mailboxes**: actors coordinate only through the office's
//!   semaphores and the occupancy counter
//! - **CancellationToken propagation**: the host passes the helper a child
//!   token; the helper stops only while idle
//! - **Shared counters**: every actor updates the same `OfficeMetrics`
//!
//! # Modules
//!
//! - [`helper`] - `HelperActor`, the single teaching assistant
//! - [`student`] - `StudentActor`, one per arriving student
//! - [`metrics`] - Lock-free office counters and their snapshot

pub mod helper;
pub mod metrics;
pub mod student;

// Re-export primary types
pub use helper::{HelperActor, HelperHandle, HelperState};
pub use self::metrics::{OfficeMetrics, OfficeMetricsSnapshot};
pub use student::{StudentActor, StudentOutcome, StudentState};
