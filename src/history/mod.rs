//! Historical price data
//!
//! Ordered OHLCV bar history with lazily-annotated momentum, plus a Parquet
//! store so annotations persist across batch runs.

mod sample;
mod store;

pub use sample::{PriceHistory, PriceSample};
pub use store::{load_history, save_history};

use thiserror::Error;

/// Historical data errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Sample timestamp is not after the previous sample
    #[error("Out-of-order sample at {0}")]
    OutOfOrder(chrono::DateTime<chrono::Utc>),
    /// History is empty where at least one sample is required
    #[error("History is empty")]
    Empty,
    /// A stored row could not be decoded
    #[error("Malformed history row: {0}")]
    Malformed(String),
    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Parquet encode/decode failed
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    /// Arrow array construction failed
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
