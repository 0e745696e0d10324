//! Weighted momentum score over fixed lagged returns

use crate::config::MomentumConfig;
use crate::history::PriceHistory;

/// Momentum scorer
///
/// `score = round(scale * Σ_i w_i * (P_now − P_{t−i}) / P_{t−i})` over the
/// configured lags. The result is in integer "momentum units"; a reading of 0
/// is a valid score, so missing lookback is reported as `None`, never 0.
#[derive(Debug, Clone)]
pub struct MomentumScorer {
    lag_bars: Vec<usize>,
    lag_weights: Vec<f64>,
    scale: f64,
    max_bucket: i32,
}

impl MomentumScorer {
    pub fn new(config: &MomentumConfig) -> Self {
        Self {
            lag_bars: config.lag_bars.clone(),
            lag_weights: config.lag_weights.clone(),
            scale: config.scale,
            max_bucket: config.max_bucket,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&MomentumConfig::default())
    }

    /// Bars of lookback required before a score exists
    pub fn min_lookback(&self) -> usize {
        self.lag_bars.iter().copied().max().unwrap_or(0)
    }

    /// Score the bar at index `t` of `history`
    ///
    /// Returns `None` when fewer than `min_lookback()` prior bars exist or a
    /// required lag price is non-positive.
    pub fn score(&self, history: &PriceHistory, t: usize) -> Option<i32> {
        self.score_closes(&history.closes(), t)
    }

    /// Score against a pre-extracted close series
    pub fn score_closes(&self, closes: &[f64], t: usize) -> Option<i32> {
        if t < self.min_lookback() || t >= closes.len() {
            return None;
        }

        let now = closes[t];
        if now <= 0.0 {
            return None;
        }

        let mut weighted = 0.0;
        for (lag, weight) in self.lag_bars.iter().zip(&self.lag_weights) {
            let then = closes[t - lag];
            if then <= 0.0 {
                return None;
            }
            weighted += weight * (now - then) / then;
        }

        Some((weighted * self.scale).round() as i32)
    }

    /// Canonical score-to-bucket mapping: clamp into [-max_bucket, +max_bucket]
    pub fn bucket(&self, score: i32) -> i32 {
        score.clamp(-self.max_bucket, self.max_bucket)
    }

    /// All buckets the fingerprints are partitioned into
    pub fn bucket_range(&self) -> std::ops::RangeInclusive<i32> {
        -self.max_bucket..=self.max_bucket
    }
}
