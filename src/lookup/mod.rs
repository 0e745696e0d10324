//! Discretized probability lookup cache
//!
//! An approximate memoization of the live interpolator over a bounded,
//! quantized (TTC, buffer, momentum) key space, built once per fingerprint
//! regeneration and read-only afterwards. The discretization resolution
//! trades table size and rebuild time against approximation error; the audit
//! module measures that error.

mod builder;
mod types;

pub use builder::build_lookup_table;
pub use types::{LookupEntry, LookupKey, LookupSpec, LookupTable};

use thiserror::Error;

/// Lookup cache errors
#[derive(Debug, Error)]
pub enum LookupError {
    /// The clamped key was skipped at build time for lack of data
    #[error("No lookup entry for ttc={ttc_seconds}s buffer_points={buffer_points} bucket={momentum_bucket}")]
    Unavailable {
        ttc_seconds: u64,
        buffer_points: u32,
        momentum_bucket: i32,
    },
    /// Current price must be positive to derive buffers
    #[error("Non-positive current price: {0}")]
    NonPositivePrice(rust_decimal::Decimal),
}
