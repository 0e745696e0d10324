//! Audit command implementation

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Instant;

use crate::audit::audit_lookup;
use crate::calculator::Calculator;
use crate::config::Config;
use crate::fingerprint::load_fingerprint_set;
use crate::lookup::{build_lookup_table, LookupSpec};
use crate::telemetry::{record_duration, DurationMetric};

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Override the fingerprint artifact path
    #[arg(long)]
    pub artifact: Option<PathBuf>,

    /// Override the configured sample count
    #[arg(long)]
    pub samples: Option<usize>,

    /// Seed the sampler for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

impl AuditArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let artifact_path = self
            .artifact
            .clone()
            .unwrap_or_else(|| config.engine.artifact_dir.join("fingerprints.json"));

        let set = load_fingerprint_set(&artifact_path)?;
        let calculator = Calculator::new(set);

        let spec =
            LookupSpec::from_config(&config.lookup, &config.fingerprint, config.momentum.max_bucket);
        let table = build_lookup_table(&calculator, spec);

        let mut audit_config = config.audit.clone();
        if let Some(samples) = self.samples {
            audit_config.sample_size = samples;
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let started = Instant::now();
        let report = audit_lookup(&table, &calculator, &audit_config, &mut rng);
        record_duration(DurationMetric::AuditRun, started.elapsed());

        println!("{}", report.format_table());
        for mismatch in &report.mismatches {
            println!(
                "  mismatch ttc={}s buffer={} bucket={} {:?}: cached {:.2} vs live {:.2} (err {:.2}pp)",
                mismatch.key.ttc_seconds,
                mismatch.key.buffer_points,
                mismatch.key.momentum_bucket,
                mismatch.direction,
                mismatch.cached,
                mismatch.live,
                mismatch.error,
            );
        }
        Ok(())
    }
}
