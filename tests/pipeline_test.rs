//! End-to-end pipeline tests: history in, probabilities out

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use touchcast::config::Config;
use touchcast::engine::{build_snapshot, SnapshotPublisher};
use touchcast::history::{PriceHistory, PriceSample};
use touchcast::momentum::{annotate_history, MomentumScorer};

fn test_config() -> Config {
    let mut config = Config::default();
    config.fingerprint.ttc_min_secs = 60;
    config.fingerprint.ttc_max_secs = 300;
    config.fingerprint.ttc_step_secs = 60;
    config.fingerprint.threshold_min_pct = 0.05;
    config.fingerprint.threshold_max_pct = 0.6;
    config.fingerprint.threshold_step_pct = 0.05;
    config.fingerprint.min_cell_samples = 10;
    config.lookup.ttc_step_secs = 60;
    config.lookup.max_buffer_points = 20;
    config.lookup.buffer_step = dec!(25);
    config.lookup.reference_price = dec!(50000);
    config.momentum.max_bucket = 10;
    config
}

/// Deterministic oscillating minute bars around 50,000
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
fn test_snapshot_pipeline_produces_queryable_probabilities() {
    let config = test_config();
    let snapshot = build_snapshot(synthetic_history(600), &config).unwrap();

    assert!(snapshot.calculator.fingerprints().base().has_data());
    assert!(!snapshot.lookup.is_empty());

    let strikes = vec![dec!(49800), dec!(50000), dec!(50200)];
    let results = snapshot
        .calculator
        .calculate_strike_probabilities(dec!(50000), 180.0, &strikes)
        .unwrap();
    assert_eq!(results.len(), 3);

    // The at-the-money strike is certain to be touched
    assert!((results[1].prob_beyond - 100.0).abs() < 1e-9);
    // Farther strikes are never more likely to be touched
    assert!(results[0].prob_beyond <= results[1].prob_beyond);
    for r in &results {
        assert!((0.0..=100.0).contains(&r.prob_beyond));
        assert_eq!(r.prob_within, 100.0 - r.prob_beyond);
    }
}

#[test]
fn test_longer_ttc_never_lowers_touch_probability() {
    let config = test_config();
    let snapshot = build_snapshot(synthetic_history(600), &config).unwrap();

    let mut last = -1.0;
    for ttc in [60.0, 120.0, 180.0, 240.0, 300.0] {
        let p = snapshot.calculator.interpolate(ttc, 0.2).unwrap();
        assert!(p >= last, "touch probability fell from {last} to {p} at ttc {ttc}");
        last = p;
    }
}

#[test]
fn test_lookup_contract_agrees_with_live_calculator() {
    let config = test_config();
    let snapshot = build_snapshot(synthetic_history(600), &config).unwrap();

    // Every populated key was memoized straight from the calculator, so a
    // cache read at exact key coordinates reproduces the live value.
    let keys: Vec<_> = snapshot.lookup.keys().copied().collect();
    assert!(!keys.is_empty());
    for key in keys.iter().step_by(97) {
        let entry = snapshot.lookup.get(key).unwrap();
        let move_pct = snapshot.lookup.spec().move_percent_for(key.buffer_points);
        let live_up = snapshot
            .calculator
            .interpolate_directional(
                touchcast::fingerprint::Direction::Up,
                key.momentum_bucket,
                key.ttc_seconds as f64,
                move_pct,
            )
            .unwrap();
        assert_eq!(entry.prob_positive, live_up);
    }
}

#[test]
fn test_momentum_annotation_is_write_once() {
    let mut history = synthetic_history(100);
    let scorer = MomentumScorer::new(&test_config().momentum);

    let first = annotate_history(&mut history, &scorer, false);
    assert!(first > 0);
    let scores: Vec<_> = history.samples().iter().map(|s| s.momentum).collect();

    // A second pass without the overwrite flag touches nothing
    let second = annotate_history(&mut history, &scorer, false);
    assert_eq!(second, 0);
    let rescored: Vec<_> = history.samples().iter().map(|s| s.momentum).collect();
    assert_eq!(scores, rescored);
}

#[test]
fn test_sparse_history_degrades_without_panicking() {
    let config = test_config();
    // Too few bars for any cell to clear min_cell_samples at the longest TTC
    let snapshot = build_snapshot(synthetic_history(8), &config).unwrap();

    assert!(!snapshot.calculator.fingerprints().base().has_data());
    assert!(snapshot.lookup.is_empty());
    assert!(snapshot
        .calculator
        .calculate_strike_probabilities(dec!(50000), 120.0, &[dec!(50100)])
        .is_err());
}

#[test]
fn test_republished_snapshot_is_visible_to_existing_handles() {
    let config = test_config();
    let first = build_snapshot(synthetic_history(400), &config).unwrap();
    let (publisher, handle) = SnapshotPublisher::new(first);

    let before = handle.current().version;
    let second = build_snapshot(synthetic_history(500), &config).unwrap();
    publisher.publish(second);
    let after = handle.current().version;

    assert_ne!(before, after);
}
