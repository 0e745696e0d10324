//! Probe command implementation

use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::calculator::Calculator;
use crate::config::Config;
use crate::fingerprint::load_fingerprint_set;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Current price
    #[arg(long)]
    pub price: Decimal,

    /// Remaining time-to-close in seconds
    #[arg(long)]
    pub ttc: f64,

    /// Strike levels to evaluate
    #[arg(required = true)]
    pub strikes: Vec<Decimal>,

    /// Override the fingerprint artifact path
    #[arg(long)]
    pub artifact: Option<PathBuf>,
}

impl ProbeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let artifact_path = self
            .artifact
            .clone()
            .unwrap_or_else(|| config.engine.artifact_dir.join("fingerprints.json"));

        let set = load_fingerprint_set(&artifact_path)?;
        let calculator = Calculator::new(set);

        let results =
            calculator.calculate_strike_probabilities(self.price, self.ttc, &self.strikes)?;

        println!(
            "{:>12} {:>10} {:>8} {:>12} {:>12}",
            "strike", "buffer", "move%", "prob_beyond", "prob_within"
        );
        for r in results {
            println!(
                "{:>12} {:>10} {:>8.3} {:>12.2} {:>12.2}",
                r.strike, r.buffer, r.move_percent, r.prob_beyond, r.prob_within
            );
        }
        Ok(())
    }
}
