//! Named metrics for the batch pipeline

use std::time::Duration;

/// Duration metric types
#[derive(Debug, Clone, Copy)]
pub enum DurationMetric {
    /// Full fingerprint set build
    FingerprintBuild,
    /// Lookup table build
    LookupBuild,
    /// One audit run
    AuditRun,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Entries in the active lookup table
    LookupEntries,
    /// Fraction of base fingerprint cells with data
    FingerprintCoverage,
    /// Momentum buckets with a directional fingerprint
    FingerprintBuckets,
    /// Latest audit accuracy percentage
    AuditAccuracyPct,
}

/// Record a batch stage duration
pub fn record_duration(metric: DurationMetric, duration: Duration) {
    let metric_name = match metric {
        DurationMetric::FingerprintBuild => "touchcast_fingerprint_build_ms",
        DurationMetric::LookupBuild => "touchcast_lookup_build_ms",
        DurationMetric::AuditRun => "touchcast_audit_run_ms",
    };

    metrics::histogram!(metric_name).record(duration.as_millis() as f64);
    tracing::debug!(
        metric = metric_name,
        value_ms = duration.as_millis() as u64,
        "Recording duration"
    );
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::LookupEntries => "touchcast_lookup_entries",
        GaugeMetric::FingerprintCoverage => "touchcast_fingerprint_coverage",
        GaugeMetric::FingerprintBuckets => "touchcast_fingerprint_buckets",
        GaugeMetric::AuditAccuracyPct => "touchcast_audit_accuracy_pct",
    };

    metrics::gauge!(metric_name).set(value);
    tracing::debug!(metric = metric_name, value = value, "Setting gauge");
}
