//! Versioned forecast snapshots and atomic publication

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use uuid::Uuid;

use super::EngineError;
use crate::calculator::Calculator;
use crate::config::Config;
use crate::fingerprint::FingerprintBuilder;
use crate::history::PriceHistory;
use crate::lookup::{build_lookup_table, LookupSpec, LookupTable};
use crate::momentum::{annotate_history, MomentumScorer};
use crate::telemetry::{record_duration, set_gauge, DurationMetric, GaugeMetric};

/// One complete build cycle's output, immutable once constructed
#[derive(Debug)]
pub struct Snapshot {
    pub version: Uuid,
    pub built_at: DateTime<Utc>,
    pub calculator: Calculator,
    pub lookup: LookupTable,
}

/// Run the full offline pipeline: annotate momentum, build the fingerprint
/// set, wrap it in a calculator, and memoize the lookup table
pub fn build_snapshot(mut history: PriceHistory, config: &Config) -> Result<Snapshot, EngineError> {
    let scorer = MomentumScorer::new(&config.momentum);
    annotate_history(&mut history, &scorer, false);

    let builder = FingerprintBuilder::from_config(&config.fingerprint, config.momentum.max_bucket)?;
    let started = Instant::now();
    let set = builder.build_set(&history)?;
    record_duration(DurationMetric::FingerprintBuild, started.elapsed());
    set_gauge(GaugeMetric::FingerprintCoverage, set.base().coverage());
    set_gauge(GaugeMetric::FingerprintBuckets, set.buckets().len() as f64);

    let calculator = Calculator::new(set);

    let spec = LookupSpec::from_config(&config.lookup, &config.fingerprint, config.momentum.max_bucket);
    let started = Instant::now();
    let lookup = build_lookup_table(&calculator, spec);
    record_duration(DurationMetric::LookupBuild, started.elapsed());

    let snapshot = Snapshot {
        version: Uuid::new_v4(),
        built_at: Utc::now(),
        calculator,
        lookup,
    };
    tracing::info!(version = %snapshot.version, "Built forecast snapshot");
    Ok(snapshot)
}

/// Read side of the active-snapshot pointer
///
/// Cheap to clone; `current()` never blocks and always returns a fully-built
/// snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    rx: watch::Receiver<Arc<Snapshot>>,
}

impl SnapshotHandle {
    pub fn current(&self) -> Arc<Snapshot> {
        self.rx.borrow().clone()
    }
}

/// Write side of the active-snapshot pointer
pub struct SnapshotPublisher {
    tx: watch::Sender<Arc<Snapshot>>,
}

impl SnapshotPublisher {
    /// Create a publisher seeded with an initial snapshot
    pub fn new(initial: Snapshot) -> (Self, SnapshotHandle) {
        let (tx, rx) = watch::channel(Arc::new(initial));
        (Self { tx }, SnapshotHandle { rx })
    }

    /// Atomically swap the active snapshot
    pub fn publish(&self, snapshot: Snapshot) {
        tracing::info!(version = %snapshot.version, "Activating snapshot");
        // send only fails with no receivers; handles may all be dropped
        let _ = self.tx.send(Arc::new(snapshot));
    }

    pub fn subscribe(&self) -> SnapshotHandle {
        SnapshotHandle {
            rx: self.tx.subscribe(),
        }
    }
}
