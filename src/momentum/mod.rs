//! Momentum scoring
//!
//! A single weighted momentum value summarizing short-term directional
//! pressure, computed from fixed lagged returns and quantized into the
//! integer bucket axis the fingerprints are partitioned by.

mod annotate;
mod scorer;

pub use annotate::annotate_history;
pub use scorer::MomentumScorer;
