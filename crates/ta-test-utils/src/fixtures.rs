//! Test fixtures for office simulations.

use std::sync::Arc;
use std::time::Duration;

use ta_office::observability::OfficeEvent;
use ta_office::office::Office;
use ta_office::simulation::{Simulation, SimulationReport, SimulationSettings};
use ta_office::timing::{DelayRange, DelaySource, RandomDuration};

/// Delay source that always returns the lower bound of the requested range.
///
/// Lets a test pick exact arrival and service times by passing degenerate
/// ranges such as `DelayRange::new(250, 250)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerBoundDelay;

impl DelaySource for LowerBoundDelay {
    fn sample(&self, range: DelayRange) -> Duration {
        Duration::from_millis(range.ordered().0)
    }
}

/// Everything a finished test run leaves behind.
#[derive(Debug)]
pub struct SimulationRun {
    pub report: SimulationReport,
    pub events: Vec<OfficeEvent>,
    pub office: Arc<Office>,
}

/// Entry point for building test simulations.
pub struct TestSimulation;

impl TestSimulation {
    pub fn builder() -> TestSimulationBuilder {
        TestSimulationBuilder::default()
    }
}

/// Builder for a simulation with deterministic defaults.
///
/// Defaults: 10 students, 5 chairs, zero arrival delay, zero service time,
/// [`LowerBoundDelay`].
#[derive(Debug, Clone)]
pub struct TestSimulationBuilder {
    students: u32,
    chairs: usize,
    service: DelayRange,
    arrival: DelayRange,
    seed: Option<u64>,
}

impl Default for TestSimulationBuilder {
    fn default() -> Self {
        Self {
            students: 10,
            chairs: 5,
            service: DelayRange::zero(),
            arrival: DelayRange::zero(),
            seed: None,
        }
    }
}

impl TestSimulationBuilder {
    pub fn students(mut self, students: u32) -> Self {
        self.students = students;
        self
    }

    pub fn chairs(mut self, chairs: usize) -> Self {
        self.chairs = chairs;
        self
    }

    /// Exact service time for every consultation.
    pub fn service_ms(mut self, ms: u64) -> Self {
        self.service = DelayRange::new(ms, ms);
        self
    }

    pub fn service_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.service = DelayRange::new(min_ms, max_ms);
        self
    }

    pub fn arrival_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.arrival = DelayRange::new(min_ms, max_ms);
        self
    }

    /// Draw delays from a seeded `RandomDuration` instead of the lower bound.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            run_id: "ta-office-test".to_string(),
            num_students: self.students,
            waiting_chairs: self.chairs,
            service: self.service,
            arrival: self.arrival,
        }
    }

    pub fn build(self) -> Simulation {
        let delays: Arc<dyn DelaySource> = match self.seed {
            Some(seed) => Arc::new(RandomDuration::from_seed(seed)),
            None => Arc::new(LowerBoundDelay),
        };
        Simulation::new(self.settings(), delays).expect("test simulation should build")
    }

    /// Build, run to completion and collect the journal.
    pub async fn run(self) -> SimulationRun {
        let simulation = self.build();
        let report = simulation.run().await.expect("test simulation should run");
        let office = Arc::clone(simulation.office());
        let events = office.journal().events();

        SimulationRun {
            report,
            events,
            office,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_bound_delay() {
        assert_eq!(
            LowerBoundDelay.sample(DelayRange::new(250, 900)),
            Duration::from_millis(250)
        );
        assert_eq!(
            LowerBoundDelay.sample(DelayRange::new(900, 250)),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_builder_settings() {
        let settings = TestSimulation::builder()
            .students(3)
            .chairs(2)
            .service_ms(40)
            .arrival_range(0, 10)
            .settings();

        assert_eq!(settings.num_students, 3);
        assert_eq!(settings.waiting_chairs, 2);
        assert_eq!(settings.service, DelayRange::new(40, 40));
        assert_eq!(settings.arrival, DelayRange::new(0, 10));
    }
}
