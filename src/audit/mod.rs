//! Lookup accuracy audit
//!
//! Samples random keys from a lookup table and recomputes each one through
//! the live calculator with the same reverse-mapping convention the builder
//! used, reporting aggregate divergence. This is an observability tool for
//! tuning discretization granularity: it logs mismatches and never fails.

use rand::Rng;

use crate::calculator::Calculator;
use crate::config::AuditConfig;
use crate::fingerprint::Direction;
use crate::lookup::{LookupKey, LookupTable};

/// One sampled key whose cached value diverged beyond tolerance
#[derive(Debug, Clone)]
pub struct AuditMismatch {
    pub key: LookupKey,
    pub direction: Direction,
    pub cached: f64,
    pub live: f64,
    pub error: f64,
}

/// Aggregate audit results
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// Keys actually sampled (0 when the table is empty)
    pub sample_size: usize,
    /// Keys whose worst directional error stayed under tolerance
    pub matches: usize,
    pub accuracy_pct: f64,
    pub max_error: f64,
    pub mean_error: f64,
    pub tolerance_pct: f64,
    pub mismatches: Vec<AuditMismatch>,
}

impl AuditReport {
    fn empty(tolerance_pct: f64) -> Self {
        Self {
            sample_size: 0,
            matches: 0,
            accuracy_pct: 0.0,
            max_error: 0.0,
            mean_error: 0.0,
            tolerance_pct,
            mismatches: Vec::new(),
        }
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               LOOKUP ACCURACY AUDIT
══════════════════════════════════════════════════════
Samples:          {}
Matches:          {} ({:.1}% within {:.2}pp)
Max Error:        {:.4}pp
Mean Error:       {:.4}pp
Mismatches:       {}
══════════════════════════════════════════════════════
"#,
            self.sample_size,
            self.matches,
            self.accuracy_pct,
            self.tolerance_pct,
            self.max_error,
            self.mean_error,
            self.mismatches.len(),
        )
    }
}

/// Audit `table` against `calculator`
///
/// Samples keys with replacement; each key is checked in both directions and
/// counts as a match only when both stay within tolerance.
pub fn audit_lookup(
    table: &LookupTable,
    calculator: &Calculator,
    config: &AuditConfig,
    rng: &mut impl Rng,
) -> AuditReport {
    let keys: Vec<LookupKey> = table.keys().copied().collect();
    if keys.is_empty() {
        tracing::warn!("Audit skipped: lookup table is empty");
        return AuditReport::empty(config.tolerance_pct);
    }

    let mut matches = 0usize;
    let mut max_error = 0.0f64;
    let mut error_sum = 0.0f64;
    let mut comparisons = 0usize;
    let mut mismatches = Vec::new();

    for _ in 0..config.sample_size {
        let key = keys[rng.gen_range(0..keys.len())];
        let entry = match table.get(&key) {
            Some(entry) => *entry,
            None => continue,
        };
        let move_percent = table.spec().move_percent_for(key.buffer_points);

        let mut key_worst = 0.0f64;
        for (direction, cached) in [
            (Direction::Up, entry.prob_positive),
            (Direction::Down, entry.prob_negative),
        ] {
            let live = match calculator.interpolate_directional(
                direction,
                key.momentum_bucket,
                key.ttc_seconds as f64,
                move_percent,
            ) {
                Ok(live) => live,
                Err(e) => {
                    // The table answered where the live path cannot; flag it
                    tracing::warn!(?key, ?direction, error = %e, "Audit: live value unavailable");
                    key_worst = f64::MAX;
                    continue;
                }
            };

            let error = (cached - live).abs();
            error_sum += error;
            comparisons += 1;
            max_error = max_error.max(error);
            key_worst = key_worst.max(error);

            if error >= config.tolerance_pct {
                tracing::warn!(
                    ?key,
                    ?direction,
                    cached,
                    live,
                    error,
                    "Audit mismatch above tolerance"
                );
                mismatches.push(AuditMismatch {
                    key,
                    direction,
                    cached,
                    live,
                    error,
                });
            }
        }

        if key_worst < config.tolerance_pct {
            matches += 1;
        }
    }

    let accuracy_pct = 100.0 * matches as f64 / config.sample_size as f64;
    let mean_error = if comparisons > 0 {
        error_sum / comparisons as f64
    } else {
        0.0
    };

    crate::telemetry::set_gauge(crate::telemetry::GaugeMetric::AuditAccuracyPct, accuracy_pct);
    tracing::info!(
        samples = config.sample_size,
        matches,
        accuracy_pct,
        max_error,
        mean_error,
        "Lookup accuracy audit complete"
    );

    AuditReport {
        sample_size: config.sample_size,
        matches,
        accuracy_pct,
        max_error,
        mean_error,
        tolerance_pct: config.tolerance_pct,
        mismatches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Calculator;
    use crate::fingerprint::{Fingerprint, FingerprintAxes, FingerprintSet};
    use crate::lookup::{build_lookup_table, LookupEntry, LookupSpec};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn calculator() -> Calculator {
        let ttc = vec![60u64, 120, 180];
        let thr = vec![0.1, 0.5, 1.0];
        let axes = FingerprintAxes::new(ttc.clone(), thr.clone()).unwrap();
        let mut cells = Vec::new();
        for ti in 0..ttc.len() {
            for mi in 0..thr.len() {
                cells.push(Some(85.0 - 25.0 * mi as f64 + 3.0 * ti as f64));
            }
        }
        Calculator::new(FingerprintSet::new(
            Fingerprint::new(axes, cells).unwrap(),
            BTreeMap::new(),
        ))
    }

    fn spec() -> LookupSpec {
        LookupSpec {
            ttc_min_secs: 60,
            ttc_max_secs: 180,
            ttc_step_secs: 60,
            max_buffer_points: 20,
            buffer_step: dec!(25),
            reference_price: dec!(50000),
            momentum_min: -5,
            momentum_max: 5,
            momentum_step: 5,
        }
    }

    #[test]
    fn test_faithful_table_audits_clean() {
        let calc = calculator();
        let table = build_lookup_table(&calc, spec());
        let config = AuditConfig {
            sample_size: 100,
            tolerance_pct: 0.5,
        };
        let mut rng = StdRng::seed_from_u64(7);

        let report = audit_lookup(&table, &calc, &config, &mut rng);

        assert_eq!(report.sample_size, 100);
        assert_eq!(report.matches, 100);
        assert_eq!(report.accuracy_pct, 100.0);
        assert_eq!(report.max_error, 0.0);
        assert!(report.mismatches.is_empty());
    }

    #[test]
    fn test_corrupted_table_flags_mismatches() {
        let calc = calculator();
        let spec = spec();

        // Hand-build a table whose every entry is 5pp low
        let mut entries = BTreeMap::new();
        for ttc in spec.ttc_keys() {
            for points in spec.buffer_keys() {
                let move_pct = spec.move_percent_for(points);
                for bucket in spec.momentum_keys() {
                    let live = calc.interpolate(ttc as f64, move_pct).unwrap();
                    entries.insert(
                        crate::lookup::LookupKey {
                            ttc_seconds: ttc,
                            buffer_points: points,
                            momentum_bucket: bucket,
                        },
                        LookupEntry {
                            prob_positive: (live - 5.0).max(0.0),
                            prob_negative: (live - 5.0).max(0.0),
                        },
                    );
                }
            }
        }
        let table = crate::lookup::LookupTable::new(spec, entries);

        let config = AuditConfig {
            sample_size: 50,
            tolerance_pct: 0.5,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let report = audit_lookup(&table, &calc, &config, &mut rng);

        assert_eq!(report.matches, 0);
        assert_eq!(report.accuracy_pct, 0.0);
        assert!(report.max_error >= 4.9);
        assert!(!report.mismatches.is_empty());
    }

    #[test]
    fn test_empty_table_never_panics() {
        let calc = calculator();
        let table = crate::lookup::LookupTable::new(spec(), BTreeMap::new());
        let config = AuditConfig::default();
        let mut rng = StdRng::seed_from_u64(1);

        let report = audit_lookup(&table, &calc, &config, &mut rng);
        assert_eq!(report.sample_size, 0);
        assert!(report.mismatches.is_empty());
    }

    #[test]
    fn test_report_formats() {
        let report = AuditReport::empty(0.5);
        let rendered = report.format_table();
        assert!(rendered.contains("LOOKUP ACCURACY AUDIT"));
    }
}
