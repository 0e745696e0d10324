//! touchcast: empirical touch-probability forecasting engine
//!
//! This library provides the core components for:
//! - Momentum scoring from lagged returns
//! - Fingerprint construction from years of bar history
//! - Live probability interpolation over fingerprint grids
//! - Discretized lookup-cache construction for O(1) retrieval
//! - Accuracy auditing of the cache against live interpolation
//! - Versioned snapshot lifecycle with atomic swaps

pub mod audit;
pub mod calculator;
pub mod cli;
pub mod config;
pub mod engine;
pub mod fingerprint;
pub mod history;
pub mod lookup;
pub mod momentum;
pub mod telemetry;
