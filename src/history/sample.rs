//! Price sample and ordered history types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::HistoryError;

/// One OHLCV bar, optionally annotated with a momentum score
///
/// `momentum` is computed lazily once enough lookback exists and is
/// write-once: the annotator never replaces a present value unless asked to
/// recompute explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Bar open time
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Momentum score in integer momentum units, if annotated
    pub momentum: Option<i32>,
}

impl PriceSample {
    /// Bar without a momentum annotation
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            momentum: None,
        }
    }

    /// Close price as f64 for grid math
    pub fn close_f64(&self) -> f64 {
        self.close.try_into().unwrap_or(0.0)
    }
}

/// Append-only ordered sequence of price samples
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    samples: Vec<PriceSample>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pre-sorted samples, rejecting out-of-order rows
    pub fn from_samples(samples: Vec<PriceSample>) -> Result<Self, HistoryError> {
        let mut history = Self::new();
        for sample in samples {
            history.push(sample)?;
        }
        Ok(history)
    }

    /// Append a bar; timestamps must be strictly increasing
    pub fn push(&mut self, sample: PriceSample) -> Result<(), HistoryError> {
        if let Some(last) = self.samples.last() {
            if sample.timestamp <= last.timestamp {
                return Err(HistoryError::OutOfOrder(sample.timestamp));
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PriceSample> {
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [PriceSample] {
        &mut self.samples
    }

    /// Timestamp of the newest bar
    pub fn latest_timestamp(&self) -> Result<DateTime<Utc>, HistoryError> {
        self.samples
            .last()
            .map(|s| s.timestamp)
            .ok_or(HistoryError::Empty)
    }

    /// Close prices as f64, in order
    pub fn closes(&self) -> Vec<f64> {
        self.samples.iter().map(PriceSample::close_f64).collect()
    }
}
