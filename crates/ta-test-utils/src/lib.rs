//! # TA Office Test Utilities
//!
//! Shared fixtures and journal assertions for office simulation tests.
//!
//! ## Modules
//!
//! - `fixtures` - Deterministic delay sources and a simulation builder
//! - `assertions` - Protocol checks over a recorded event journal and the
//!   office state a run leaves behind
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ta_test_utils::*;
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_example() {
//!     let run = TestSimulation::builder()
//!         .students(10)
//!         .chairs(5)
//!         .service_ms(100)
//!         .run()
//!         .await;
//!
//!     run.events
//!         .assert_capacity_respected(5)
//!         .assert_consultations_serialized()
//!         .assert_all_terminal(10);
//! }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::{JournalAssertions, OfficeAssertions};
pub use fixtures::{LowerBoundDelay, SimulationRun, TestSimulation, TestSimulationBuilder};
