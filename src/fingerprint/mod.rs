//! Empirical touch-probability fingerprints
//!
//! A fingerprint is a 2-D table of probability-of-touch values indexed by
//! time-to-close and move-percent threshold, built offline from years of bar
//! history. Directional variants (up/down) are kept per momentum bucket so
//! live queries can condition on current directional pressure.

mod artifact;
mod builder;
mod types;

pub use artifact::{load_fingerprint_set, save_fingerprint_set};
pub use builder::{BuildFilter, FingerprintBuilder, Weighting};
pub use types::{Direction, DirectionalFingerprint, Fingerprint, FingerprintAxes, FingerprintSet};

use thiserror::Error;

/// Fingerprint construction and artifact errors
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// Axes are empty, unsorted, or inconsistent with the cell grid
    #[error("Invalid fingerprint axes: {0}")]
    InvalidAxes(String),
    /// A stored artifact failed validation at load time
    #[error("Malformed fingerprint artifact: {0}")]
    Artifact(String),
    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON encode/decode failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
