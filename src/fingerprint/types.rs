//! Fingerprint table types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::FingerprintError;

/// Direction of a price move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Price rises by at least the threshold
    Up,
    /// Price falls by at least the threshold
    Down,
}

/// The two grid axes: TTC values (seconds) and move thresholds (percent)
///
/// Both are typed, sorted numeric collections; threshold semantics never
/// travel through formatted strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintAxes {
    ttc_secs: Vec<u64>,
    thresholds_pct: Vec<f64>,
}

impl FingerprintAxes {
    pub fn new(ttc_secs: Vec<u64>, thresholds_pct: Vec<f64>) -> Result<Self, FingerprintError> {
        if ttc_secs.is_empty() {
            return Err(FingerprintError::InvalidAxes("empty TTC axis".into()));
        }
        if thresholds_pct.is_empty() {
            return Err(FingerprintError::InvalidAxes("empty threshold axis".into()));
        }
        if !ttc_secs.windows(2).all(|w| w[0] < w[1]) {
            return Err(FingerprintError::InvalidAxes(
                "TTC axis not strictly ascending".into(),
            ));
        }
        if !thresholds_pct.windows(2).all(|w| w[0] < w[1]) {
            return Err(FingerprintError::InvalidAxes(
                "threshold axis not strictly ascending".into(),
            ));
        }
        if thresholds_pct[0] <= 0.0 {
            return Err(FingerprintError::InvalidAxes(
                "thresholds must be positive".into(),
            ));
        }
        Ok(Self {
            ttc_secs,
            thresholds_pct,
        })
    }

    pub fn ttc_secs(&self) -> &[u64] {
        &self.ttc_secs
    }

    pub fn thresholds_pct(&self) -> &[f64] {
        &self.thresholds_pct
    }

    pub fn cell_count(&self) -> usize {
        self.ttc_secs.len() * self.thresholds_pct.len()
    }

    /// Number of thresholds at or below `realized` move percent
    pub fn thresholds_reached(&self, realized_pct: f64) -> usize {
        self.thresholds_pct
            .partition_point(|t| *t <= realized_pct + 1e-12)
    }
}

/// One empirical probability-of-touch table
///
/// Cells are `None` where too few samples contributed; an unavailable cell is
/// never reported as 0% or 100%.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fingerprint {
    axes: FingerprintAxes,
    /// Row-major: `cells[ttc_index * thresholds + threshold_index]`
    cells: Vec<Option<f64>>,
}

impl Fingerprint {
    pub fn new(axes: FingerprintAxes, cells: Vec<Option<f64>>) -> Result<Self, FingerprintError> {
        if cells.len() != axes.cell_count() {
            return Err(FingerprintError::InvalidAxes(format!(
                "{} cells for a {}x{} grid",
                cells.len(),
                axes.ttc_secs().len(),
                axes.thresholds_pct().len()
            )));
        }
        Ok(Self { axes, cells })
    }

    pub fn axes(&self) -> &FingerprintAxes {
        &self.axes
    }

    /// Probability at grid indices, if available
    pub fn cell(&self, ttc_index: usize, threshold_index: usize) -> Option<f64> {
        let thresholds = self.axes.thresholds_pct().len();
        if ttc_index >= self.axes.ttc_secs().len() || threshold_index >= thresholds {
            return None;
        }
        self.cells[ttc_index * thresholds + threshold_index]
    }

    /// True if any cell holds a value
    pub fn has_data(&self) -> bool {
        self.cells.iter().any(Option::is_some)
    }

    /// Fraction of cells holding a value
    pub fn coverage(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().filter(|c| c.is_some()).count() as f64 / self.cells.len() as f64
    }

    /// Check that all present values are valid probabilities
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.cells.len() != self.axes.cell_count() {
            return Err(FingerprintError::Artifact("cell grid size mismatch".into()));
        }
        for value in self.cells.iter().flatten() {
            if !(0.0..=100.0).contains(value) || !value.is_finite() {
                return Err(FingerprintError::Artifact(format!(
                    "probability {value} outside [0, 100]"
                )));
            }
        }
        Ok(())
    }
}

/// A pair of fingerprints split by move direction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionalFingerprint {
    pub up: Fingerprint,
    pub down: Fingerprint,
}

impl DirectionalFingerprint {
    pub fn for_direction(&self, direction: Direction) -> &Fingerprint {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }
}

/// Everything one build cycle produces: the non-directional base table plus a
/// directional pair per momentum bucket that had enough data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintSet {
    base: Fingerprint,
    buckets: BTreeMap<i32, DirectionalFingerprint>,
}

impl FingerprintSet {
    pub fn new(base: Fingerprint, buckets: BTreeMap<i32, DirectionalFingerprint>) -> Self {
        Self { base, buckets }
    }

    pub fn base(&self) -> &Fingerprint {
        &self.base
    }

    pub fn buckets(&self) -> &BTreeMap<i32, DirectionalFingerprint> {
        &self.buckets
    }

    /// The bucketed pair exactly matching `bucket`, if built
    pub fn bucket(&self, bucket: i32) -> Option<&DirectionalFingerprint> {
        self.buckets.get(&bucket)
    }

    /// The populated bucket nearest to `bucket`
    pub fn nearest_bucket(&self, bucket: i32) -> Option<(i32, &DirectionalFingerprint)> {
        self.buckets
            .iter()
            .min_by_key(|(b, _)| (**b - bucket).abs())
            .map(|(b, fp)| (*b, fp))
    }

    /// Fail-fast artifact validation: all tables share the base axes and hold
    /// in-range probabilities
    pub fn validate(&self) -> Result<(), FingerprintError> {
        self.base.validate()?;
        for (bucket, pair) in &self.buckets {
            pair.up.validate()?;
            pair.down.validate()?;
            if pair.up.axes() != self.base.axes() || pair.down.axes() != self.base.axes() {
                return Err(FingerprintError::Artifact(format!(
                    "bucket {bucket} axes differ from base axes"
                )));
            }
        }
        Ok(())
    }
}
