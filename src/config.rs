//! Configuration types for touchcast

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub momentum: MomentumConfig,
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Historical data input configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Parquet file holding the annotated bar history
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

fn default_history_path() -> PathBuf {
    PathBuf::from("./data/history.parquet")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
        }
    }
}

/// Momentum scoring configuration
///
/// The score is a weighted sum of simple returns over a fixed set of lags,
/// scaled into integer "momentum units".
#[derive(Debug, Clone, Deserialize)]
pub struct MomentumConfig {
    /// Lags (in bars) contributing to the score
    #[serde(default = "default_lag_bars")]
    pub lag_bars: Vec<usize>,

    /// Weight per lag, same order as `lag_bars`; must sum to 1.0
    #[serde(default = "default_lag_weights")]
    pub lag_weights: Vec<f64>,

    /// Scale applied to the weighted return before rounding
    #[serde(default = "default_momentum_scale")]
    pub scale: f64,

    /// Bucket range half-width: buckets span [-max_bucket, +max_bucket]
    #[serde(default = "default_max_bucket")]
    pub max_bucket: i32,
}

fn default_lag_bars() -> Vec<usize> {
    vec![1, 2, 3, 4, 15, 30]
}
fn default_lag_weights() -> Vec<f64> {
    vec![0.30, 0.25, 0.20, 0.15, 0.05, 0.05]
}
fn default_momentum_scale() -> f64 {
    10_000.0
}
fn default_max_bucket() -> i32 {
    30
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lag_bars: default_lag_bars(),
            lag_weights: default_lag_weights(),
            scale: default_momentum_scale(),
            max_bucket: default_max_bucket(),
        }
    }
}

/// Fingerprint axes and estimation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FingerprintConfig {
    /// Smallest tabulated TTC (seconds)
    #[serde(default = "default_ttc_min_secs")]
    pub ttc_min_secs: u64,

    /// Largest tabulated TTC (seconds)
    #[serde(default = "default_ttc_max_secs")]
    pub ttc_max_secs: u64,

    /// TTC grid step (seconds)
    #[serde(default = "default_ttc_step_secs")]
    pub ttc_step_secs: u64,

    /// Smallest move threshold (percent)
    #[serde(default = "default_threshold_min_pct")]
    pub threshold_min_pct: f64,

    /// Largest move threshold (percent)
    #[serde(default = "default_threshold_max_pct")]
    pub threshold_max_pct: f64,

    /// Threshold grid step (percent)
    #[serde(default = "default_threshold_step_pct")]
    pub threshold_step_pct: f64,

    /// Cells with fewer raw contributing rows than this are unavailable
    #[serde(default = "default_min_cell_samples")]
    pub min_cell_samples: usize,

    /// Recency decay applied per year of sample age (1.0 = uniform)
    #[serde(default = "default_recency_decay")]
    pub recency_decay_per_year: f64,

    /// Seconds covered by one bar of the input history (60 for minute bars)
    #[serde(default = "default_bar_interval_secs")]
    pub bar_interval_secs: u64,
}

fn default_ttc_min_secs() -> u64 {
    60
}
fn default_ttc_max_secs() -> u64 {
    3600
}
fn default_ttc_step_secs() -> u64 {
    60
}
fn default_threshold_min_pct() -> f64 {
    0.05
}
fn default_threshold_max_pct() -> f64 {
    2.00
}
fn default_threshold_step_pct() -> f64 {
    0.05
}
fn default_min_cell_samples() -> usize {
    10
}
fn default_recency_decay() -> f64 {
    0.8
}
fn default_bar_interval_secs() -> u64 {
    60
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            ttc_min_secs: default_ttc_min_secs(),
            ttc_max_secs: default_ttc_max_secs(),
            ttc_step_secs: default_ttc_step_secs(),
            threshold_min_pct: default_threshold_min_pct(),
            threshold_max_pct: default_threshold_max_pct(),
            threshold_step_pct: default_threshold_step_pct(),
            min_cell_samples: default_min_cell_samples(),
            recency_decay_per_year: default_recency_decay(),
            bar_interval_secs: default_bar_interval_secs(),
        }
    }
}

impl FingerprintConfig {
    /// Materialize the TTC axis (seconds, ascending)
    pub fn ttc_axis(&self) -> Vec<u64> {
        (self.ttc_min_secs..=self.ttc_max_secs)
            .step_by(self.ttc_step_secs.max(1) as usize)
            .collect()
    }

    /// Materialize the threshold axis (percent, ascending)
    pub fn threshold_axis(&self) -> Vec<f64> {
        let mut axis = Vec::new();
        let mut k = 0u32;
        let mut t = self.threshold_min_pct;
        while t <= self.threshold_max_pct + 1e-9 {
            axis.push(t);
            k += 1;
            t = self.threshold_min_pct + f64::from(k) * self.threshold_step_pct;
        }
        axis
    }
}

/// Lookup-table discretization configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// TTC quantization step (seconds)
    #[serde(default = "default_lookup_ttc_step")]
    pub ttc_step_secs: u64,

    /// Buffer axis length: buffer_points span 0..=max_buffer_points
    #[serde(default = "default_max_buffer_points")]
    pub max_buffer_points: u32,

    /// Price units represented by one buffer point
    #[serde(default = "default_buffer_step")]
    pub buffer_step: Decimal,

    /// Reference price used to map buffer points back to move percent
    #[serde(default = "default_reference_price")]
    pub reference_price: Decimal,

    /// Momentum bucket quantization step
    #[serde(default = "default_momentum_bucket_step")]
    pub momentum_bucket_step: i32,
}

fn default_lookup_ttc_step() -> u64 {
    15
}
fn default_max_buffer_points() -> u32 {
    100
}
fn default_buffer_step() -> Decimal {
    Decimal::new(10, 0)
}
fn default_reference_price() -> Decimal {
    Decimal::new(50_000, 0)
}
fn default_momentum_bucket_step() -> i32 {
    5
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            ttc_step_secs: default_lookup_ttc_step(),
            max_buffer_points: default_max_buffer_points(),
            buffer_step: default_buffer_step(),
            reference_price: default_reference_price(),
            momentum_bucket_step: default_momentum_bucket_step(),
        }
    }
}

/// Accuracy audit configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Number of random keys to sample per audit run
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Match tolerance in percentage points
    #[serde(default = "default_tolerance_pct")]
    pub tolerance_pct: f64,
}

fn default_sample_size() -> usize {
    100
}
fn default_tolerance_pct() -> f64 {
    0.5
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            tolerance_pct: default_tolerance_pct(),
        }
    }
}

/// Rebuild/snapshot lifecycle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Hours between fingerprint/lookup rebuilds (default: weekly)
    #[serde(default = "default_rebuild_interval_hours")]
    pub rebuild_interval_hours: u64,

    /// Directory for fingerprint artifacts
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
}

fn default_rebuild_interval_hours() -> u64 {
    168
}
fn default_artifact_dir() -> PathBuf {
    PathBuf::from("./artifacts")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rebuild_interval_hours: default_rebuild_interval_hours(),
            artifact_dir: default_artifact_dir(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants that serde cannot express
    pub fn validate(&self) -> anyhow::Result<()> {
        let m = &self.momentum;
        if m.lag_bars.len() != m.lag_weights.len() {
            anyhow::bail!(
                "momentum: {} lags but {} weights",
                m.lag_bars.len(),
                m.lag_weights.len()
            );
        }
        let weight_sum: f64 = m.lag_weights.iter().sum();
        if (weight_sum - 1.0).abs() > 1e-9 {
            anyhow::bail!("momentum: lag weights sum to {weight_sum}, expected 1.0");
        }
        if m.max_bucket <= 0 {
            anyhow::bail!("momentum: max_bucket must be positive");
        }

        let f = &self.fingerprint;
        if f.ttc_min_secs == 0 || f.ttc_min_secs > f.ttc_max_secs {
            anyhow::bail!(
                "fingerprint: invalid TTC range {}..{}",
                f.ttc_min_secs,
                f.ttc_max_secs
            );
        }
        if f.threshold_min_pct <= 0.0 || f.threshold_min_pct > f.threshold_max_pct {
            anyhow::bail!(
                "fingerprint: invalid threshold range {}..{}",
                f.threshold_min_pct,
                f.threshold_max_pct
            );
        }
        if f.threshold_step_pct <= 0.0 {
            anyhow::bail!("fingerprint: threshold_step_pct must be positive");
        }
        if f.recency_decay_per_year <= 0.0 || f.recency_decay_per_year > 1.0 {
            anyhow::bail!(
                "fingerprint: recency_decay_per_year {} outside (0, 1]",
                f.recency_decay_per_year
            );
        }
        if f.bar_interval_secs == 0 {
            anyhow::bail!("fingerprint: bar_interval_secs must be positive");
        }

        let l = &self.lookup;
        if l.ttc_step_secs == 0 || l.momentum_bucket_step <= 0 {
            anyhow::bail!("lookup: quantization steps must be positive");
        }
        if l.buffer_step <= Decimal::ZERO || l.reference_price <= Decimal::ZERO {
            anyhow::bail!("lookup: buffer_step and reference_price must be positive");
        }

        if self.audit.sample_size == 0 {
            anyhow::bail!("audit: sample_size must be positive");
        }
        if self.audit.tolerance_pct <= 0.0 {
            anyhow::bail!("audit: tolerance_pct must be positive");
        }

        Ok(())
    }
}
