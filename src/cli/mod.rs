//! CLI interface for touchcast
//!
//! Provides subcommands for:
//! - `build`: annotate momentum and rebuild fingerprint artifacts
//! - `audit`: measure lookup-cache divergence from live interpolation
//! - `probe`: query strike probabilities against the current artifacts
//! - `config`: show effective configuration

mod audit;
mod build;
mod probe;

pub use audit::AuditArgs;
pub use build::BuildArgs;
pub use probe::ProbeArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "touchcast")]
#[command(about = "Empirical touch-probability forecasting engine")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Annotate momentum and rebuild fingerprint artifacts
    Build(BuildArgs),
    /// Audit the lookup cache against live interpolation
    Audit(AuditArgs),
    /// Query strike probabilities
    Probe(ProbeArgs),
    /// Show effective configuration
    Config,
}
