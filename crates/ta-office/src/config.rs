//! Office simulation configuration.
//!
//! Configuration is loaded from environment variables. Every value has a
//! default equal to the classic simulation constants, so an empty
//! environment runs 10 students against 5 waiting chairs.

use crate::simulation::SimulationSettings;
use crate::timing::DelayRange;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Default number of students launched per run.
pub const DEFAULT_NUM_STUDENTS: u32 = 10;

/// Default number of chairs in the waiting room.
pub const DEFAULT_WAITING_CHAIRS: usize = 5;

/// Default minimum time the helper spends with a student.
pub const DEFAULT_SERVICE_MIN_MS: u64 = 1000;

/// Default maximum time the helper spends with a student.
pub const DEFAULT_SERVICE_MAX_MS: u64 = 3000;

/// Default minimum delay before a student arrives.
pub const DEFAULT_ARRIVAL_MIN_MS: u64 = 0;

/// Default maximum delay before a student arrives.
pub const DEFAULT_ARRIVAL_MAX_MS: u64 = 2000;

/// Default run ID prefix.
pub const DEFAULT_RUN_ID_PREFIX: &str = "ta-office";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable narration.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue(format!(
                "TA_LOG_FORMAT must be 'pretty' or 'json', got '{other}'"
            ))),
        }
    }
}

/// Office simulation configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier attached to logs and the final report.
    pub run_id: String,

    /// Total number of students to simulate.
    pub num_students: u32,

    /// Number of chairs in the waiting room (>= 1).
    pub waiting_chairs: usize,

    /// Bounds for how long the helper spends with one student.
    pub service: DelayRange,

    /// Bounds for how long a student waits before arriving.
    pub arrival: DelayRange,

    /// Seed for the delay generator. `None` seeds from the wall clock.
    pub random_seed: Option<u64>,

    /// Log output format.
    pub log_format: LogFormat,

    /// Prometheus exporter listen address. `None` disables the exporter.
    pub metrics_bind_address: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(format!("{name} could not be parsed from '{raw}'"))
        }),
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let num_students = parse_var(vars, "TA_NUM_STUDENTS", DEFAULT_NUM_STUDENTS)?;

        let waiting_chairs = parse_var(vars, "TA_WAITING_CHAIRS", DEFAULT_WAITING_CHAIRS)?;
        if waiting_chairs == 0 {
            return Err(ConfigError::InvalidValue(
                "TA_WAITING_CHAIRS must be at least 1".to_string(),
            ));
        }

        let service = DelayRange::new(
            parse_var(vars, "TA_SERVICE_MIN_MS", DEFAULT_SERVICE_MIN_MS)?,
            parse_var(vars, "TA_SERVICE_MAX_MS", DEFAULT_SERVICE_MAX_MS)?,
        );

        let arrival = DelayRange::new(
            parse_var(vars, "TA_ARRIVAL_MIN_MS", DEFAULT_ARRIVAL_MIN_MS)?,
            parse_var(vars, "TA_ARRIVAL_MAX_MS", DEFAULT_ARRIVAL_MAX_MS)?,
        );

        let random_seed = vars
            .get("TA_RANDOM_SEED")
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "TA_RANDOM_SEED could not be parsed from '{raw}'"
                    ))
                })
            })
            .transpose()?;

        let log_format = match vars.get("TA_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        let metrics_bind_address = vars
            .get("TA_METRICS_BIND_ADDRESS")
            .filter(|addr| !addr.trim().is_empty())
            .cloned();

        let run_id = vars.get("TA_RUN_ID").cloned().unwrap_or_else(|| {
            let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "local".to_string());
            let uuid_suffix = uuid::Uuid::new_v4().to_string();
            let short_suffix = uuid_suffix.get(..8).unwrap_or("00000000");
            format!("{DEFAULT_RUN_ID_PREFIX}-{hostname}-{short_suffix}")
        });

        Ok(Config {
            run_id,
            num_students,
            waiting_chairs,
            service,
            arrival,
            random_seed,
            log_format,
            metrics_bind_address,
        })
    }

    /// Settings for one simulation run.
    #[must_use]
    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            run_id: self.run_id.clone(),
            num_students: self.num_students,
            waiting_chairs: self.waiting_chairs,
            service: self.service,
            arrival: self.arrival,
        }
    }
}
