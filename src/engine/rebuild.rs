//! Periodic snapshot rebuild task
//!
//! An explicit, cancellable tokio task owned by the caller: it wakes on a
//! fixed interval, reloads history, rebuilds a snapshot off to the side, and
//! publishes it. Shutdown is a watch channel the caller signals; there is no
//! global running flag.

use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{build_snapshot, SnapshotPublisher};
use crate::config::Config;
use crate::history::{load_history, PriceHistory};

/// Source of bar history for rebuilds
pub trait HistorySource: Send + Sync + 'static {
    fn load(&self) -> anyhow::Result<PriceHistory>;
}

/// Loads history from the configured Parquet file
pub struct ParquetHistorySource {
    path: PathBuf,
}

impl ParquetHistorySource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HistorySource for ParquetHistorySource {
    fn load(&self) -> anyhow::Result<PriceHistory> {
        Ok(load_history(&self.path)?)
    }
}

/// Spawn the rebuild loop
///
/// Sends `true` on the shutdown channel to stop the task; the current
/// rebuild, if one is mid-flight, completes and publishes before exit is
/// observed.
pub fn spawn_rebuild_task(
    publisher: SnapshotPublisher,
    source: impl HistorySource,
    config: Config,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The caller seeds the publisher; the first tick fires immediately
        // and would rebuild right away
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    rebuild_once(&publisher, &source, &config).await;
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        tracing::info!("Rebuild task shutting down");
                        break;
                    }
                }
            }
        }
    })
}

async fn rebuild_once(publisher: &SnapshotPublisher, source: &impl HistorySource, config: &Config) {
    let history = match source.load() {
        Ok(history) => history,
        Err(e) => {
            tracing::error!(error = %e, "Rebuild aborted: could not load history");
            return;
        }
    };

    let config = config.clone();
    let built = tokio::task::spawn_blocking(move || build_snapshot(history, &config)).await;

    match built {
        Ok(Ok(snapshot)) => publisher.publish(snapshot),
        Ok(Err(e)) => tracing::error!(error = %e, "Rebuild failed"),
        Err(e) => tracing::error!(error = %e, "Rebuild task panicked"),
    }
}
