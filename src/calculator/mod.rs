//! Live probability interpolation
//!
//! The calculator owns an immutable fingerprint set and answers continuous
//! (TTC, move-percent) queries by bilinear interpolation over the tabulated
//! grid, with a nearest-neighbor fallback where cells are unavailable. It is
//! an explicit, caller-owned object; there is no ambient cached instance.

mod bilinear;
mod strike;

pub use strike::{Calculator, StrikeProbability};

use thiserror::Error;

/// Interpolation errors
#[derive(Debug, Error)]
pub enum CalcError {
    /// No tabulated value can answer the query
    #[error("Probability unavailable for ttc={ttc_seconds}s move={move_percent}%")]
    Unavailable { ttc_seconds: f64, move_percent: f64 },
    /// Current price must be positive to derive move percentages
    #[error("Non-positive current price: {0}")]
    NonPositivePrice(rust_decimal::Decimal),
}
