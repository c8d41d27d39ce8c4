//! Teaching-assistant office simulation.
//!
//! One helper serves students one at a time. Students who arrive while the
//! helper is busy wait on a bounded number of chairs; a student who finds
//! every chair taken leaves immediately and never returns.
//!
//! # Architecture
//!
//! ```text
//! Simulation
//! ├── Office
//! │   ├── WaitingRoom        (occupancy counter + chair semaphore)
//! │   └── RendezvousChannel  (presence / accepted / finished)
//! ├── HelperActor            (sleeps while nobody is present)
//! └── StudentActor × N       (arrive, sit or leave, consult, depart)
//! ```
//!
//! # Key Design Decisions
//!
//! - **Implicit pairing**: the rendezvous signals carry no student ID; the
//!   helper never sends the next `accepted` before the previous `finished`
//! - **Two capacity checks**: a lock-guarded counter decides admission, a
//!   semaphore bounds chair holders
//! - **Chair released at acceptance**: a consulting student no longer
//!   counts towards occupancy
//!
//! # Modules
//!
//! - [`actors`] - Helper and student actors, shared counters
//! - [`config`] - Configuration from environment
//! - [`errors`] - Error types
//! - [`observability`] - Prometheus metrics and the event journal
//! - [`office`] - Waiting room and rendezvous channel
//! - [`simulation`] - Run host and report
//! - [`timing`] - Bounded delay generation
//! - [`types`] - Student and actor identifiers

pub mod actors;
pub mod config;
pub mod errors;
pub mod observability;
pub mod office;
pub mod simulation;
pub mod timing;
pub mod types;
