//! Telemetry module
//!
//! Structured logging and named metrics for batch builds and audits

mod logging;
mod metrics;

pub use logging::init_logging;
pub use metrics::{record_duration, set_gauge, DurationMetric, GaugeMetric};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level)
}
