//! Snapshot lifecycle
//!
//! A snapshot bundles one build cycle's calculator and lookup table under a
//! single version. Readers hold a handle to the currently active snapshot;
//! the rebuild task builds a complete replacement off to the side and swaps
//! it in atomically, so no reader ever observes a half-populated table.

mod rebuild;
mod snapshot;

pub use rebuild::{spawn_rebuild_task, HistorySource, ParquetHistorySource};
pub use snapshot::{build_snapshot, Snapshot, SnapshotHandle, SnapshotPublisher};

use thiserror::Error;

/// Snapshot build errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Fingerprint(#[from] crate::fingerprint::FingerprintError),
    #[error(transparent)]
    History(#[from] crate::history::HistoryError),
}
