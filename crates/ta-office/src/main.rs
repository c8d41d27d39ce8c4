//! TA Office
//!
//! Runs one office-hours simulation and prints a JSON report.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment
//! 2. Initialize tracing (pretty or JSON)
//! 3. Initialize Prometheus metrics exporter, if an address is configured
//! 4. Seed the delay generator
//! 5. Run the simulation and log the report
//!
//! # Runtime
//!
//! The process runs on a current-thread runtime. Students are paired with
//! the helper through unaddressed signals, and a student that has been
//! accepted must be waiting on `finished` before the helper can accept the
//! next one. With a single thread that ordering always holds; worker threads
//! could let two consultations overlap. `Simulation::run` rejects any other
//! flavor.

#![warn(clippy::pedantic)]

use std::net::SocketAddr;
use std::sync::Arc;

use ta_office::config::{Config, LogFormat};
use ta_office::errors::OfficeError;
use ta_office::observability::init_metrics_recorder;
use ta_office::simulation::Simulation;
use ta_office::timing::RandomDuration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration decides the log format, so it is loaded first and any
    // error is reported once tracing is up
    let config = Config::from_env();
    let json = matches!(&config, Ok(c) if c.log_format == LogFormat::Json);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ta_office=info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();

    info!("Starting TA Office");

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        OfficeError::from(e)
    })?;

    info!(
        run_id = %config.run_id,
        num_students = config.num_students,
        waiting_chairs = config.waiting_chairs,
        service_min_ms = config.service.min_ms,
        service_max_ms = config.service.max_ms,
        arrival_min_ms = config.arrival.min_ms,
        arrival_max_ms = config.arrival.max_ms,
        "Configuration loaded successfully"
    );

    if let Some(addr) = &config.metrics_bind_address {
        let addr: SocketAddr = addr.parse().map_err(|e| {
            error!(address = %addr, error = %e, "Invalid metrics bind address");
            OfficeError::Config(format!("TA_METRICS_BIND_ADDRESS '{addr}' is invalid: {e}"))
        })?;
        init_metrics_recorder(addr).map_err(|e| {
            error!(error = %e, "Failed to install Prometheus metrics recorder");
            OfficeError::Metrics(e)
        })?;
        info!(address = %addr, "Prometheus metrics exporter listening");
    }

    let delays = match config.random_seed {
        Some(seed) => RandomDuration::from_seed(seed),
        None => RandomDuration::from_wall_clock(),
    };
    info!(seed = delays.seed(), "Delay generator seeded");

    let simulation = Simulation::new(config.simulation_settings(), Arc::new(delays))?;
    let report = simulation.run().await.map_err(|e| {
        error!(error = %e, "Simulation failed");
        e
    })?;

    let report_json = serde_json::to_string(&report)?;
    info!(report = %report_json, "Simulation report");

    Ok(())
}
