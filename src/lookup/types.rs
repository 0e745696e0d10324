//! Lookup table key space and storage

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::LookupError;
use crate::calculator::StrikeProbability;
use crate::config::{FingerprintConfig, LookupConfig};

/// Quantized cache key, unique per entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LookupKey {
    pub ttc_seconds: u64,
    /// Buffer distance in points, clamped to the configured axis
    pub buffer_points: u32,
    pub momentum_bucket: i32,
}

/// Cached directional probabilities for one key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupEntry {
    /// Probability of touching the buffer to the upside
    pub prob_positive: f64,
    /// Probability of touching the buffer to the downside
    pub prob_negative: f64,
}

/// Discretization of the key space and the buffer reverse-mapping convention
#[derive(Debug, Clone)]
pub struct LookupSpec {
    pub ttc_min_secs: u64,
    pub ttc_max_secs: u64,
    pub ttc_step_secs: u64,
    pub max_buffer_points: u32,
    /// Price units represented by one buffer point
    pub buffer_step: Decimal,
    /// Reference price mapping buffers back into move-percent space
    pub reference_price: Decimal,
    pub momentum_min: i32,
    pub momentum_max: i32,
    pub momentum_step: i32,
}

impl LookupSpec {
    /// Derive the key space from configuration: TTC range follows the
    /// fingerprint axis, momentum range follows the bucket axis
    pub fn from_config(
        lookup: &LookupConfig,
        fingerprint: &FingerprintConfig,
        max_bucket: i32,
    ) -> Self {
        Self {
            ttc_min_secs: fingerprint.ttc_min_secs,
            ttc_max_secs: fingerprint.ttc_max_secs,
            ttc_step_secs: lookup.ttc_step_secs,
            max_buffer_points: lookup.max_buffer_points,
            buffer_step: lookup.buffer_step,
            reference_price: lookup.reference_price,
            momentum_min: -max_bucket,
            momentum_max: max_bucket,
            momentum_step: lookup.momentum_bucket_step,
        }
    }

    pub fn ttc_keys(&self) -> Vec<u64> {
        (self.ttc_min_secs..=self.ttc_max_secs)
            .step_by(self.ttc_step_secs.max(1) as usize)
            .collect()
    }

    pub fn buffer_keys(&self) -> Vec<u32> {
        (0..=self.max_buffer_points).collect()
    }

    pub fn momentum_keys(&self) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut b = self.momentum_min;
        while b <= self.momentum_max {
            keys.push(b);
            b += self.momentum_step.max(1);
        }
        keys
    }

    /// Reverse-mapping convention shared by the builder and the auditor
    pub fn move_percent_for(&self, buffer_points: u32) -> f64 {
        let buffer: f64 = (self.buffer_step * Decimal::from(buffer_points))
            .try_into()
            .unwrap_or(0.0);
        let reference: f64 = self.reference_price.try_into().unwrap_or(1.0);
        buffer / reference * 100.0
    }

    /// Clamp-and-snap a continuous query onto the key grid
    ///
    /// Out-of-range components clamp to the nearest valid bucket; this is
    /// part of the read contract, not an error.
    pub fn quantize(&self, ttc_seconds: f64, buffer: Decimal, momentum_bucket: i32) -> LookupKey {
        let ttc = ttc_seconds.clamp(self.ttc_min_secs as f64, self.ttc_max_secs as f64);
        let step = self.ttc_step_secs.max(1);
        let max_index = (self.ttc_max_secs - self.ttc_min_secs) / step;
        let index =
            (((ttc - self.ttc_min_secs as f64) / step as f64).round() as u64).min(max_index);
        let ttc_snapped = self.ttc_min_secs + index * step;

        let points_raw: f64 = (buffer / self.buffer_step).try_into().unwrap_or(0.0);
        let buffer_points = (points_raw.round().max(0.0) as u32).min(self.max_buffer_points);

        let clamped = momentum_bucket.clamp(self.momentum_min, self.momentum_max);
        let mstep = self.momentum_step.max(1);
        let max_mindex = (self.momentum_max - self.momentum_min) / mstep;
        let offset = clamped - self.momentum_min;
        let mindex = ((offset as f64 / mstep as f64).round() as i32).min(max_mindex);
        let momentum = self.momentum_min + mindex * mstep;

        LookupKey {
            ttc_seconds: ttc_snapped,
            buffer_points,
            momentum_bucket: momentum,
        }
    }
}

/// Read-only discretized probability table
///
/// Built in full before being handed to readers; a new build produces a new
/// table under a fresh version id, swapped in atomically by the engine.
#[derive(Debug, Clone)]
pub struct LookupTable {
    version: Uuid,
    built_at: DateTime<Utc>,
    spec: LookupSpec,
    entries: BTreeMap<LookupKey, LookupEntry>,
}

impl LookupTable {
    pub fn new(spec: LookupSpec, entries: BTreeMap<LookupKey, LookupEntry>) -> Self {
        Self {
            version: Uuid::new_v4(),
            built_at: Utc::now(),
            spec,
            entries,
        }
    }

    pub fn version(&self) -> Uuid {
        self.version
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn spec(&self) -> &LookupSpec {
        &self.spec
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &LookupKey> {
        self.entries.keys()
    }

    /// Exact-key read
    pub fn get(&self, key: &LookupKey) -> Option<&LookupEntry> {
        self.entries.get(key)
    }

    /// Clamp-and-snap read for continuous query coordinates
    pub fn get_clamped(
        &self,
        ttc_seconds: f64,
        buffer: Decimal,
        momentum_bucket: i32,
    ) -> Result<(LookupKey, LookupEntry), LookupError> {
        let key = self.spec.quantize(ttc_seconds, buffer, momentum_bucket);
        match self.entries.get(&key) {
            Some(entry) => Ok((key, *entry)),
            None => Err(LookupError::Unavailable {
                ttc_seconds: key.ttc_seconds,
                buffer_points: key.buffer_points,
                momentum_bucket: key.momentum_bucket,
            }),
        }
    }

    /// The strike query contract, served from the cache
    ///
    /// Same shape as the live calculator's contract so callers can swap
    /// implementations; keys snap to the quantized grid first.
    pub fn calculate_strike_probabilities(
        &self,
        current_price: Decimal,
        ttc_seconds: f64,
        strikes: &[Decimal],
        momentum_bucket: i32,
    ) -> Result<Vec<StrikeProbability>, LookupError> {
        if current_price <= Decimal::ZERO {
            return Err(LookupError::NonPositivePrice(current_price));
        }
        let price_f64: f64 = current_price.try_into().unwrap_or(0.0);

        let mut results = Vec::with_capacity(strikes.len());
        for strike in strikes {
            let buffer = (*strike - current_price).abs();
            let buffer_f64: f64 = buffer.try_into().unwrap_or(0.0);
            let (_, entry) = self.get_clamped(ttc_seconds, buffer, momentum_bucket)?;

            // Strike above price resolves through upward touches, below
            // through downward; at the money the sides are equivalent
            let prob_beyond = if *strike >= current_price {
                entry.prob_positive
            } else {
                entry.prob_negative
            };

            results.push(StrikeProbability {
                strike: *strike,
                buffer,
                move_percent: buffer_f64 / price_f64 * 100.0,
                prob_beyond,
                prob_within: 100.0 - prob_beyond,
            });
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn spec() -> LookupSpec {
        LookupSpec {
            ttc_min_secs: 60,
            ttc_max_secs: 600,
            ttc_step_secs: 30,
            max_buffer_points: 100,
            buffer_step: dec!(10),
            reference_price: dec!(50000),
            momentum_min: -30,
            momentum_max: 30,
            momentum_step: 5,
        }
    }

    #[test]
    fn test_key_axes() {
        let spec = spec();
        let ttcs = spec.ttc_keys();
        assert_eq!(ttcs.first(), Some(&60));
        assert_eq!(ttcs.last(), Some(&600));
        assert_eq!(spec.buffer_keys().len(), 101);

        let momenta = spec.momentum_keys();
        assert_eq!(momenta.first(), Some(&-30));
        assert_eq!(momenta.last(), Some(&30));
        assert!(momenta.contains(&0));
    }

    #[test]
    fn test_move_percent_convention() {
        let spec = spec();
        // 50 points * 10 units = 500; 500 / 50000 = 1%
        assert!((spec.move_percent_for(50) - 1.0).abs() < 1e-12);
        assert_eq!(spec.move_percent_for(0), 0.0);
    }

    #[test]
    fn test_quantize_snaps_to_grid() {
        let spec = spec();
        let key = spec.quantize(127.0, dec!(247), 7);
        assert_eq!(key.ttc_seconds, 120);
        assert_eq!(key.buffer_points, 25);
        assert_eq!(key.momentum_bucket, 5);
    }

    #[test]
    fn test_quantize_clamps_out_of_range() {
        let spec = spec();

        let low = spec.quantize(1.0, dec!(0), -99);
        assert_eq!(low.ttc_seconds, 60);
        assert_eq!(low.buffer_points, 0);
        assert_eq!(low.momentum_bucket, -30);

        let high = spec.quantize(7200.0, dec!(99999), 99);
        assert_eq!(high.ttc_seconds, 600);
        assert_eq!(high.buffer_points, 100);
        assert_eq!(high.momentum_bucket, 30);
    }

    #[test]
    fn test_get_clamped_missing_key() {
        let table = LookupTable::new(spec(), BTreeMap::new());
        let result = table.get_clamped(120.0, dec!(100), 0);
        assert!(matches!(result, Err(LookupError::Unavailable { .. })));
    }

    #[test]
    fn test_strike_contract_directions() {
        let spec = spec();
        let mut entries = BTreeMap::new();
        // Populate the whole bucket-0 slice with asymmetric probabilities
        for ttc in spec.ttc_keys() {
            for points in spec.buffer_keys() {
                entries.insert(
                    LookupKey {
                        ttc_seconds: ttc,
                        buffer_points: points,
                        momentum_bucket: 0,
                    },
                    LookupEntry {
                        prob_positive: 70.0,
                        prob_negative: 40.0,
                    },
                );
            }
        }
        let table = LookupTable::new(spec, entries);

        let results = table
            .calculate_strike_probabilities(
                dec!(50000),
                300.0,
                &[dec!(49500), dec!(50500)],
                2, // snaps to bucket 0
            )
            .unwrap();

        assert_eq!(results[0].prob_beyond, 40.0); // below price: downside
        assert_eq!(results[1].prob_beyond, 70.0); // above price: upside
        assert_eq!(results[0].prob_within, 60.0);
        assert_eq!(results[1].prob_within, 30.0);
    }

    #[test]
    fn test_new_tables_get_fresh_versions() {
        let a = LookupTable::new(spec(), BTreeMap::new());
        let b = LookupTable::new(spec(), BTreeMap::new());
        assert_ne!(a.version(), b.version());
    }
}
