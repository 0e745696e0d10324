//! Fingerprint construction from annotated bar history
//!
//! Single pass per origin row: walk the look-ahead window once, tracking the
//! running path extremes, and record which thresholds each TTC stop had
//! touched. Success and total accumulators carry the same recency weight so
//! the ratio stays a probability.

use std::collections::BTreeMap;

use super::{
    Direction, DirectionalFingerprint, Fingerprint, FingerprintAxes, FingerprintError,
    FingerprintSet,
};
use crate::config::FingerprintConfig;
use crate::history::PriceHistory;

/// Recency weighting scheme for origin rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weighting {
    /// Every row counts equally
    Uniform,
    /// Weight decays by `per_year` for each year of age relative to the
    /// newest sample
    RecencyDecay { per_year: f64 },
}

impl Weighting {
    /// Weight of a row `age_days` older than the newest sample
    pub fn weight(&self, age_days: f64) -> f64 {
        match self {
            Weighting::Uniform => 1.0,
            Weighting::RecencyDecay { per_year } => per_year.powf(age_days.max(0.0) / 365.25),
        }
    }
}

/// Optional restrictions on which rows and which move sign contribute
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildFilter {
    /// Only rows whose momentum bucket matches contribute
    pub momentum_bucket: Option<i32>,
    /// Count only up or only down touches; `None` counts absolute moves
    pub direction: Option<Direction>,
}

/// Builds fingerprints from a price history
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    axes: FingerprintAxes,
    min_cell_samples: usize,
    bar_interval_secs: u64,
    weighting: Weighting,
    max_bucket: i32,
}

impl FingerprintBuilder {
    pub fn new(
        axes: FingerprintAxes,
        min_cell_samples: usize,
        bar_interval_secs: u64,
        weighting: Weighting,
        max_bucket: i32,
    ) -> Self {
        Self {
            axes,
            min_cell_samples,
            bar_interval_secs,
            weighting,
            max_bucket,
        }
    }

    pub fn from_config(
        config: &FingerprintConfig,
        max_bucket: i32,
    ) -> Result<Self, FingerprintError> {
        let axes = FingerprintAxes::new(config.ttc_axis(), config.threshold_axis())?;
        let weighting = if config.recency_decay_per_year >= 1.0 {
            Weighting::Uniform
        } else {
            Weighting::RecencyDecay {
                per_year: config.recency_decay_per_year,
            }
        };
        Ok(Self::new(
            axes,
            config.min_cell_samples,
            config.bar_interval_secs,
            weighting,
            max_bucket,
        ))
    }

    pub fn axes(&self) -> &FingerprintAxes {
        &self.axes
    }

    /// Build one fingerprint under the given filter
    pub fn build(
        &self,
        history: &PriceHistory,
        filter: &BuildFilter,
    ) -> Result<Fingerprint, FingerprintError> {
        let axes = self.axes.clone();
        let threshold_count = axes.thresholds_pct().len();
        let ttc_count = axes.ttc_secs().len();

        // TTC stops expressed as forward bar offsets
        let bar_offsets: Vec<usize> = axes
            .ttc_secs()
            .iter()
            .map(|ttc| {
                ((*ttc as f64 / self.bar_interval_secs as f64).round() as usize).max(1)
            })
            .collect();
        let max_offset = *bar_offsets.last().unwrap_or(&1);

        let samples = history.samples();
        let closes = history.closes();
        let latest_ts = match history.latest_timestamp() {
            Ok(ts) if samples.len() > max_offset => ts,
            // Not enough look-ahead room for a single origin
            _ => return Fingerprint::new(axes, vec![None; ttc_count * threshold_count]),
        };

        // bins[k][c] = weighted mass of origins that touched exactly c
        // thresholds by TTC stop k
        let mut bins = vec![vec![0.0f64; threshold_count + 1]; ttc_count];
        let mut total_weight = 0.0f64;
        let mut raw_count = 0usize;

        for i in 0..samples.len() - max_offset {
            let sample = &samples[i];
            if let Some(want) = filter.momentum_bucket {
                match sample.momentum {
                    Some(score) if score.clamp(-self.max_bucket, self.max_bucket) == want => {}
                    _ => continue,
                }
            }
            let origin = closes[i];
            if origin <= 0.0 {
                continue;
            }

            let age_days = (latest_ts - sample.timestamp).num_seconds() as f64 / 86_400.0;
            let weight = self.weighting.weight(age_days);
            total_weight += weight;
            raw_count += 1;

            let mut run_up = 0.0f64;
            let mut run_down = 0.0f64;
            let mut j = i;
            for (k, offset) in bar_offsets.iter().enumerate() {
                while j < i + offset {
                    j += 1;
                    let move_pct = (closes[j] - origin) / origin * 100.0;
                    run_up = run_up.max(move_pct);
                    run_down = run_down.min(move_pct);
                }
                let realized = match filter.direction {
                    None => run_up.max(-run_down),
                    Some(Direction::Up) => run_up,
                    Some(Direction::Down) => -run_down,
                };
                bins[k][axes.thresholds_reached(realized)] += weight;
            }
        }

        let available = raw_count >= self.min_cell_samples && total_weight > 0.0;
        let mut cells = Vec::with_capacity(ttc_count * threshold_count);
        for k in 0..ttc_count {
            // suffix[c] = weighted mass that touched at least c thresholds
            let mut suffix = vec![0.0f64; threshold_count + 2];
            for c in (0..=threshold_count).rev() {
                suffix[c] = suffix[c + 1] + bins[k][c];
            }
            for m in 0..threshold_count {
                cells.push(if available {
                    Some((100.0 * suffix[m + 1] / total_weight).clamp(0.0, 100.0))
                } else {
                    None
                });
            }
        }

        Fingerprint::new(axes, cells)
    }

    /// Build the full set: the non-directional base table plus directional
    /// pairs for every momentum bucket that has data
    pub fn build_set(&self, history: &PriceHistory) -> Result<FingerprintSet, FingerprintError> {
        let base = self.build(history, &BuildFilter::default())?;

        let mut buckets = BTreeMap::new();
        for bucket in -self.max_bucket..=self.max_bucket {
            let up = self.build(
                history,
                &BuildFilter {
                    momentum_bucket: Some(bucket),
                    direction: Some(Direction::Up),
                },
            )?;
            if !up.has_data() {
                continue;
            }
            let down = self.build(
                history,
                &BuildFilter {
                    momentum_bucket: Some(bucket),
                    direction: Some(Direction::Down),
                },
            )?;
            buckets.insert(bucket, DirectionalFingerprint { up, down });
        }

        tracing::info!(
            buckets = buckets.len(),
            base_coverage = base.coverage(),
            "Built fingerprint set"
        );
        Ok(FingerprintSet::new(base, buckets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::PriceSample;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn base_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn history_from_closes(closes: &[f64]) -> PriceHistory {
        let base = base_time();
        let mut history = PriceHistory::new();
        for (i, close) in closes.iter().enumerate() {
            let c = Decimal::try_from(*close).unwrap();
            history
                .push(PriceSample::new(
                    base + Duration::minutes(i as i64),
                    c,
                    c,
                    c,
                    c,
                    dec!(1),
                ))
                .unwrap();
        }
        history
    }

    fn builder(axes: FingerprintAxes, min_samples: usize) -> FingerprintBuilder {
        FingerprintBuilder::new(axes, min_samples, 60, Weighting::Uniform, 30)
    }

    #[test]
    fn test_alternating_history_probabilities() {
        // Closes alternate 100, 101: every origin sees a ~1% absolute move
        // within one bar, but only origins at 100 see a move >= 0.995%.
        let closes: Vec<f64> = (0..200)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let history = history_from_closes(&closes);
        let axes = FingerprintAxes::new(vec![60], vec![0.5, 0.995]).unwrap();

        let fp = builder(axes, 1)
            .build(&history, &BuildFilter::default())
            .unwrap();

        // Every origin's 1-bar absolute move is ~0.99% or 1.0%
        assert_eq!(fp.cell(0, 0), Some(100.0));
        // Only the ~half of origins at 100 reach 0.995%
        let p = fp.cell(0, 1).unwrap();
        assert!((p - 50.0).abs() < 2.0, "expected ~50, got {p}");
    }

    #[test]
    fn test_monotonic_in_threshold_and_ttc() {
        // Deterministic wiggly walk
        let closes: Vec<f64> = (0..500)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 0.8 + i as f64 * 0.002)
            .collect();
        let history = history_from_closes(&closes);
        let axes =
            FingerprintAxes::new(vec![60, 120, 300, 600], vec![0.1, 0.3, 0.5, 0.8, 1.2]).unwrap();

        let fp = builder(axes.clone(), 1)
            .build(&history, &BuildFilter::default())
            .unwrap();

        for k in 0..axes.ttc_secs().len() {
            for m in 1..axes.thresholds_pct().len() {
                let lo = fp.cell(k, m - 1).unwrap();
                let hi = fp.cell(k, m).unwrap();
                assert!(lo >= hi, "threshold monotonicity violated at ({k}, {m})");
            }
        }
        for m in 0..axes.thresholds_pct().len() {
            for k in 1..axes.ttc_secs().len() {
                let short = fp.cell(k - 1, m).unwrap();
                let long = fp.cell(k, m).unwrap();
                assert!(long >= short, "TTC monotonicity violated at ({k}, {m})");
            }
        }
    }

    #[test]
    fn test_min_cell_samples_marks_unavailable() {
        let closes = vec![100.0; 40];
        let history = history_from_closes(&closes);
        let axes = FingerprintAxes::new(vec![60], vec![0.5]).unwrap();

        // 39 origins available but 100 required
        let fp = builder(axes, 100)
            .build(&history, &BuildFilter::default())
            .unwrap();
        assert_eq!(fp.cell(0, 0), None);
        assert!(!fp.has_data());
    }

    #[test]
    fn test_too_short_history_all_unavailable() {
        let history = history_from_closes(&[100.0, 100.5]);
        let axes = FingerprintAxes::new(vec![600], vec![0.5]).unwrap();
        let fp = builder(axes, 1)
            .build(&history, &BuildFilter::default())
            .unwrap();
        assert!(!fp.has_data());
    }

    #[test]
    fn test_directional_split_in_trending_history() {
        // Steady uptrend: up-touches happen constantly, down-touches never
        let closes: Vec<f64> = (0..300).map(|i| 100.0 * 1.001f64.powi(i)).collect();
        let history = history_from_closes(&closes);
        let axes = FingerprintAxes::new(vec![300], vec![0.2]).unwrap();
        let b = builder(axes, 1);

        let up = b
            .build(
                &history,
                &BuildFilter {
                    momentum_bucket: None,
                    direction: Some(Direction::Up),
                },
            )
            .unwrap();
        let down = b
            .build(
                &history,
                &BuildFilter {
                    momentum_bucket: None,
                    direction: Some(Direction::Down),
                },
            )
            .unwrap();

        assert_eq!(up.cell(0, 0), Some(100.0));
        assert_eq!(down.cell(0, 0), Some(0.0));
    }

    #[test]
    fn test_momentum_filter_selects_rows() {
        // Annotate alternating buckets; only bucket-5 rows sit at 100 and
        // always touch within a bar.
        let closes: Vec<f64> = (0..200)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
            .collect();
        let mut history = history_from_closes(&closes);
        for (i, sample) in history.samples_mut().iter_mut().enumerate() {
            sample.momentum = Some(if i % 2 == 0 { 5 } else { -5 });
        }
        let axes = FingerprintAxes::new(vec![60], vec![1.5]).unwrap();
        let b = builder(axes, 1);

        let bucket5 = b
            .build(
                &history,
                &BuildFilter {
                    momentum_bucket: Some(5),
                    direction: None,
                },
            )
            .unwrap();
        // From 100 the next bar is 102: +2% touch
        assert_eq!(bucket5.cell(0, 0), Some(100.0));

        // From 102 the next bar is 100: -1.96%, an absolute touch but never
        // an upward one
        let bucket_minus5 = b
            .build(
                &history,
                &BuildFilter {
                    momentum_bucket: Some(-5),
                    direction: None,
                },
            )
            .unwrap();
        assert_eq!(bucket_minus5.cell(0, 0), Some(100.0));

        let bucket_minus5_up = b
            .build(
                &history,
                &BuildFilter {
                    momentum_bucket: Some(-5),
                    direction: Some(Direction::Up),
                },
            )
            .unwrap();
        assert_eq!(bucket_minus5_up.cell(0, 0), Some(0.0));
    }

    #[test]
    fn test_unannotated_rows_skipped_under_filter() {
        let closes = vec![100.0; 60];
        let history = history_from_closes(&closes);
        let axes = FingerprintAxes::new(vec![60], vec![0.5]).unwrap();
        let fp = builder(axes, 1)
            .build(
                &history,
                &BuildFilter {
                    momentum_bucket: Some(0),
                    direction: None,
                },
            )
            .unwrap();
        // No row carries an annotation, so nothing contributes
        assert!(!fp.has_data());
    }

    #[test]
    fn test_recency_weight_decay() {
        let w = Weighting::RecencyDecay { per_year: 0.8 };
        assert!((w.weight(0.0) - 1.0).abs() < 1e-12);
        assert!((w.weight(365.25) - 0.8).abs() < 1e-9);
        assert!(w.weight(730.5) < w.weight(365.25));
        assert_eq!(Weighting::Uniform.weight(10_000.0), 1.0);
    }

    #[test]
    fn test_recency_weighting_tilts_toward_recent_rows() {
        // First half of the history (old, two years back) always touches;
        // second half (recent) never does. Decay should pull the estimate
        // below the uniform 50%.
        let base = base_time();
        let mut history = PriceHistory::new();
        let mut push = |ts, close: f64| {
            let c = Decimal::try_from(close).unwrap();
            history
                .push(PriceSample::new(ts, c, c, c, c, dec!(1)))
                .unwrap();
        };
        for i in 0..100 {
            push(
                base + Duration::minutes(i),
                if i % 2 == 0 { 100.0 } else { 103.0 },
            );
        }
        for i in 0..100 {
            push(base + Duration::days(730) + Duration::minutes(i), 100.0);
        }

        let axes = FingerprintAxes::new(vec![60], vec![1.0]).unwrap();
        let uniform = FingerprintBuilder::new(axes.clone(), 1, 60, Weighting::Uniform, 30)
            .build(&history, &BuildFilter::default())
            .unwrap()
            .cell(0, 0)
            .unwrap();
        let decayed = FingerprintBuilder::new(
            axes,
            1,
            60,
            Weighting::RecencyDecay { per_year: 0.5 },
            30,
        )
        .build(&history, &BuildFilter::default())
        .unwrap()
        .cell(0, 0)
        .unwrap();

        assert!(decayed < uniform, "decayed {decayed} !< uniform {uniform}");
    }

    #[test]
    fn test_build_set_skips_empty_buckets() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 0.6)
            .collect();
        let mut history = history_from_closes(&closes);
        for sample in history.samples_mut().iter_mut() {
            sample.momentum = Some(3);
        }
        let axes = FingerprintAxes::new(vec![60, 120], vec![0.2, 0.5]).unwrap();
        let set = builder(axes, 1).build_set(&history).unwrap();

        assert!(set.base().has_data());
        assert_eq!(set.buckets().len(), 1);
        assert!(set.bucket(3).is_some());
        assert!(set.bucket(0).is_none());
    }

    #[test]
    fn test_from_config_uniform_when_decay_is_one() {
        let mut config = FingerprintConfig::default();
        config.recency_decay_per_year = 1.0;
        let b = FingerprintBuilder::from_config(&config, 30).unwrap();
        assert_eq!(b.weighting, Weighting::Uniform);
    }
}
