//! Lookup table construction
//!
//! Walks the full quantized key space, asks the live calculator for both
//! directional probabilities at each key's continuous equivalent, and stores
//! the pair. Keys whose interpolation is unavailable are skipped, never
//! fabricated. The table is complete before it is returned; publishing it to
//! readers is the engine's atomic-swap concern.

use std::collections::BTreeMap;
use std::time::Instant;

use super::{LookupEntry, LookupKey, LookupSpec, LookupTable};
use crate::calculator::Calculator;
use crate::fingerprint::Direction;

/// Build a lookup table by memoizing the calculator over `spec`'s key space
pub fn build_lookup_table(calculator: &Calculator, spec: LookupSpec) -> LookupTable {
    let started = Instant::now();
    let mut entries = BTreeMap::new();
    let mut skipped = 0usize;

    for ttc in spec.ttc_keys() {
        for buffer_points in spec.buffer_keys() {
            let move_percent = spec.move_percent_for(buffer_points);
            for momentum_bucket in spec.momentum_keys() {
                let positive = calculator.interpolate_directional(
                    Direction::Up,
                    momentum_bucket,
                    ttc as f64,
                    move_percent,
                );
                let negative = calculator.interpolate_directional(
                    Direction::Down,
                    momentum_bucket,
                    ttc as f64,
                    move_percent,
                );

                match (positive, negative) {
                    (Ok(prob_positive), Ok(prob_negative)) => {
                        entries.insert(
                            LookupKey {
                                ttc_seconds: ttc,
                                buffer_points,
                                momentum_bucket,
                            },
                            LookupEntry {
                                prob_positive,
                                prob_negative,
                            },
                        );
                    }
                    _ => skipped += 1,
                }
            }
        }
    }

    let table = LookupTable::new(spec, entries);
    crate::telemetry::set_gauge(crate::telemetry::GaugeMetric::LookupEntries, table.len() as f64);
    tracing::info!(
        version = %table.version(),
        entries = table.len(),
        skipped,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Built lookup table"
    );
    table
}
