//! Build command implementation

use clap::Args;
use std::path::PathBuf;

use crate::config::Config;
use crate::fingerprint::{save_fingerprint_set, FingerprintBuilder};
use crate::history::{load_history, save_history};
use crate::momentum::{annotate_history, MomentumScorer};

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Override the configured history Parquet file
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Recompute momentum annotations even where already present
    #[arg(long)]
    pub recompute_momentum: bool,

    /// Skip writing the re-annotated history back to disk
    #[arg(long)]
    pub no_save_history: bool,
}

impl BuildArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let history_path = self
            .history
            .clone()
            .unwrap_or_else(|| config.data.history_path.clone());

        tracing::info!(path = ?history_path, "Loading history");
        let mut history = load_history(&history_path)?;

        let scorer = MomentumScorer::new(&config.momentum);
        let annotated = annotate_history(&mut history, &scorer, self.recompute_momentum);
        if annotated > 0 && !self.no_save_history {
            save_history(&history_path, &history)?;
        }

        let builder =
            FingerprintBuilder::from_config(&config.fingerprint, config.momentum.max_bucket)?;
        let set = builder.build_set(&history)?;

        let artifact_path = config.engine.artifact_dir.join("fingerprints.json");
        save_fingerprint_set(&artifact_path, &set)?;

        println!("Build complete");
        println!("  History bars:       {}", history.len());
        println!("  Momentum annotated: {annotated}");
        println!("  Base coverage:      {:.1}%", set.base().coverage() * 100.0);
        println!("  Momentum buckets:   {}", set.buckets().len());
        println!("  Artifact:           {}", artifact_path.display());
        Ok(())
    }
}
