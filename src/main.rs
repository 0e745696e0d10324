use clap::Parser;
use touchcast::cli::{Cli, Commands};
use touchcast::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    touchcast::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Build(args) => {
            tracing::info!("Starting fingerprint build");
            args.execute(&config).await?;
        }
        Commands::Audit(args) => {
            tracing::info!("Starting lookup audit");
            args.execute(&config).await?;
        }
        Commands::Probe(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  History:     {}", config.data.history_path.display());
            println!(
                "  Momentum:    {} lags, max bucket ±{}",
                config.momentum.lag_bars.len(),
                config.momentum.max_bucket
            );
            println!(
                "  Fingerprint: ttc {}..{}s step {}s, thresholds {}..{}% step {}%",
                config.fingerprint.ttc_min_secs,
                config.fingerprint.ttc_max_secs,
                config.fingerprint.ttc_step_secs,
                config.fingerprint.threshold_min_pct,
                config.fingerprint.threshold_max_pct,
                config.fingerprint.threshold_step_pct,
            );
            println!(
                "  Lookup:      ttc step {}s, {} buffer points of {} @ ref {}",
                config.lookup.ttc_step_secs,
                config.lookup.max_buffer_points,
                config.lookup.buffer_step,
                config.lookup.reference_price,
            );
            println!(
                "  Audit:       {} samples, {}pp tolerance",
                config.audit.sample_size, config.audit.tolerance_pct
            );
        }
    }

    Ok(())
}
