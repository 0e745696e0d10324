//! Fingerprint artifact persistence
//!
//! Fingerprint sets are serialized as JSON and validated fail-fast on load:
//! a malformed artifact is a configuration error, never partially used.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::{FingerprintError, FingerprintSet};

/// Write a fingerprint set to a JSON artifact
pub fn save_fingerprint_set(
    path: impl AsRef<Path>,
    set: &FingerprintSet,
) -> Result<(), FingerprintError> {
    set.validate()?;
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path.as_ref())?;
    serde_json::to_writer(BufWriter::new(file), set)?;
    tracing::debug!(path = ?path.as_ref(), buckets = set.buckets().len(), "Saved fingerprint artifact");
    Ok(())
}

/// Load and validate a fingerprint set from a JSON artifact
pub fn load_fingerprint_set(path: impl AsRef<Path>) -> Result<FingerprintSet, FingerprintError> {
    let file = File::open(path.as_ref())?;
    let set: FingerprintSet = serde_json::from_reader(BufReader::new(file))?;
    set.validate()?;
    tracing::debug!(path = ?path.as_ref(), buckets = set.buckets().len(), "Loaded fingerprint artifact");
    Ok(set)
}
