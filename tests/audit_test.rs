//! Lookup-cache accuracy audit over a freshly built pipeline

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use touchcast::audit::audit_lookup;
use touchcast::config::{AuditConfig, Config};
use touchcast::engine::build_snapshot;
use touchcast::history::{PriceHistory, PriceSample};

fn test_config() -> Config {
    let mut config = Config::default();
    config.fingerprint.ttc_min_secs = 60;
    config.fingerprint.ttc_max_secs = 300;
    config.fingerprint.ttc_step_secs = 60;
    config.fingerprint.threshold_min_pct = 0.05;
    config.fingerprint.threshold_max_pct = 0.6;
    config.fingerprint.threshold_step_pct = 0.05;
    config.fingerprint.min_cell_samples = 10;
    config.lookup.ttc_step_secs = 30;
    config.lookup.max_buffer_points = 30;
    config.lookup.buffer_step = dec!(20);
    config.lookup.reference_price = dec!(50000);
    config.momentum.max_bucket = 10;
    config
}

fn synthetic_history(bars: usize) -> PriceHistory {
    let base = DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let mut history = PriceHistory::new();
    for i in 0..bars {
        let close = 50_000.0 + (i as f64 * 0.31).sin() * 120.0 + (i as f64 * 0.07).cos() * 60.0;
        let c = Decimal::try_from(close).unwrap();
        history
            .push(PriceSample::new(
                base + Duration::minutes(i as i64),
                c,
                c,
                c,
                c,
                dec!(2),
            ))
            .unwrap();
    }
    history
}

#[test]
fn test_audit_of_fresh_build_is_exact() {
    let config = test_config();
    let snapshot = build_snapshot(synthetic_history(600), &config).unwrap();

    let audit_config = AuditConfig {
        sample_size: 200,
        tolerance_pct: 0.5,
    };
    let mut rng = StdRng::seed_from_u64(2024);
    let report = audit_lookup(&snapshot.lookup, &snapshot.calculator, &audit_config, &mut rng);

    // The builder memoizes the very calculator the audit replays, and the
    // audit reverses buffers with the same convention, so divergence is zero.
    assert_eq!(report.sample_size, 200);
    assert_eq!(report.matches, 200);
    assert_eq!(report.accuracy_pct, 100.0);
    assert_eq!(report.max_error, 0.0);
    assert!(report.mismatches.is_empty());
}

#[test]
fn test_audit_is_reproducible_under_a_seed() {
    let config = test_config();
    let snapshot = build_snapshot(synthetic_history(600), &config).unwrap();
    let audit_config = AuditConfig {
        sample_size: 50,
        tolerance_pct: 0.5,
    };

    let a = audit_lookup(
        &snapshot.lookup,
        &snapshot.calculator,
        &audit_config,
        &mut StdRng::seed_from_u64(9),
    );
    let b = audit_lookup(
        &snapshot.lookup,
        &snapshot.calculator,
        &audit_config,
        &mut StdRng::seed_from_u64(9),
    );

    assert_eq!(a.matches, b.matches);
    assert_eq!(a.max_error, b.max_error);
    assert_eq!(a.mean_error, b.mean_error);
}
