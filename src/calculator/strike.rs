//! Strike probability calculator

use rust_decimal::Decimal;
use serde::Serialize;

use super::bilinear;
use super::CalcError;
use crate::fingerprint::{Direction, Fingerprint, FingerprintSet};

/// Probability verdict for one strike
///
/// Ephemeral per-query result; `prob_within` is derived from `prob_beyond`
/// so the pair always sums to exactly 100.
#[derive(Debug, Clone, Serialize)]
pub struct StrikeProbability {
    pub strike: Decimal,
    /// Absolute distance from the current price
    pub buffer: Decimal,
    /// Buffer as a percentage of the current price
    pub move_percent: f64,
    /// Probability price touches the strike within the TTC
    pub prob_beyond: f64,
    /// Complement: price stays inside the buffer
    pub prob_within: f64,
}

/// Interpolating touch-probability calculator over an immutable fingerprint
/// set
///
/// Construct once with loaded fingerprints and pass by reference; queries
/// are pure and safe to issue from any number of callers.
#[derive(Debug, Clone)]
pub struct Calculator {
    set: FingerprintSet,
}

impl Calculator {
    pub fn new(set: FingerprintSet) -> Self {
        if !set.base().has_data() {
            tracing::warn!("Calculator built over a fingerprint with no available cells");
        }
        Self { set }
    }

    pub fn fingerprints(&self) -> &FingerprintSet {
        &self.set
    }

    /// Touch probability for an absolute move of `move_percent` within
    /// `ttc_seconds`, from the non-directional base fingerprint
    pub fn interpolate(&self, ttc_seconds: f64, move_percent: f64) -> Result<f64, CalcError> {
        Self::interpolate_over(self.set.base(), ttc_seconds, move_percent)
    }

    /// Directional touch probability conditioned on a momentum bucket
    ///
    /// Snaps to the nearest bucket that has a fingerprint; falls back to the
    /// base table when no bucketed fingerprints exist at all.
    pub fn interpolate_directional(
        &self,
        direction: Direction,
        momentum_bucket: i32,
        ttc_seconds: f64,
        move_percent: f64,
    ) -> Result<f64, CalcError> {
        match self.set.nearest_bucket(momentum_bucket) {
            Some((_, pair)) => {
                Self::interpolate_over(pair.for_direction(direction), ttc_seconds, move_percent)
            }
            None => self.interpolate(ttc_seconds, move_percent),
        }
    }

    /// The public strike query contract
    pub fn calculate_strike_probabilities(
        &self,
        current_price: Decimal,
        ttc_seconds: f64,
        strikes: &[Decimal],
    ) -> Result<Vec<StrikeProbability>, CalcError> {
        if current_price <= Decimal::ZERO {
            return Err(CalcError::NonPositivePrice(current_price));
        }
        let price_f64: f64 = current_price.try_into().unwrap_or(0.0);

        let mut results = Vec::with_capacity(strikes.len());
        for strike in strikes {
            let buffer = (*strike - current_price).abs();
            let buffer_f64: f64 = buffer.try_into().unwrap_or(0.0);
            let move_percent = buffer_f64 / price_f64 * 100.0;

            let prob_beyond = self.interpolate(ttc_seconds, move_percent)?;
            results.push(StrikeProbability {
                strike: *strike,
                buffer,
                move_percent,
                prob_beyond,
                prob_within: 100.0 - prob_beyond,
            });
        }
        Ok(results)
    }

    fn interpolate_over(
        fp: &Fingerprint,
        ttc_seconds: f64,
        move_percent: f64,
    ) -> Result<f64, CalcError> {
        let unavailable = || CalcError::Unavailable {
            ttc_seconds,
            move_percent,
        };

        if !fp.has_data() {
            return Err(unavailable());
        }

        // A move of nothing is always touched
        if move_percent <= 0.0 {
            return Ok(100.0);
        }

        let thresholds = fp.axes().thresholds_pct();
        let smallest = thresholds[0];
        let largest = *thresholds.last().unwrap();

        if move_percent < smallest {
            // Linear ramp from (0%, 100) to the smallest tabulated column
            let at_smallest =
                bilinear::value_at(fp, ttc_seconds, smallest).ok_or_else(unavailable)?;
            return Ok(100.0 + (at_smallest - 100.0) * (move_percent / smallest));
        }

        let query = move_percent.min(largest);
        bilinear::value_at(fp, ttc_seconds, query).ok_or_else(unavailable)
    }
}
