//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and overrides of the configuration file.

use anofox_stream::config::Config;
use anofox_stream::detection::DetectorKind;
use anofox_stream::report::OutputFormat;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// anofox-stream - anomaly detection on a simulated periodic stream
///
/// Generates a noisy seasonal signal, injects random spikes and runs a
/// streaming detector over it, then reports what was flagged.
///
/// Examples:
///   anofox-stream
///   anofox-stream --detector sma --steps 20000 --seed 42
///   anofox-stream --detector ema --format csv --output run.csv
///   anofox-stream --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for anofox-stream.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write a default anofox-stream.toml and exit
    #[arg(long)]
    pub init_config: bool,

    /// Detection algorithm (overrides config)
    #[arg(short, long, value_enum, env = "ANOFOX_DETECTOR")]
    pub detector: Option<DetectorKind>,

    /// Total number of samples to generate
    #[arg(short = 'n', long, default_value = "7000", value_name = "N")]
    pub steps: usize,

    /// Samples generated per batch
    #[arg(long, default_value = "250", value_name = "N")]
    pub batch_size: usize,

    /// Hours between samples (overrides config)
    #[arg(long, value_name = "HOURS")]
    pub delta: Option<f64>,

    /// Feed the detector every n-th sample only (overrides config)
    #[arg(long, value_name = "N")]
    pub every_n: Option<usize>,

    /// Maximum points kept in the sliding window (overrides config)
    #[arg(long, value_name = "N")]
    pub window_max: Option<usize>,

    /// Z-score threshold for the selected detector (overrides config)
    #[arg(long, value_name = "Z")]
    pub threshold: Option<f64>,

    /// Seed for reproducible streams (overrides config)
    #[arg(long, env = "ANOFOX_SEED")]
    pub seed: Option<u64>,

    /// Run without injected anomalies
    #[arg(long)]
    pub no_anomalies: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    pub format: OutputFormat,

    /// Output file path (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("--batch-size must be at least 1".to_string());
        }
        if let Some(delta) = self.delta {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(format!("--delta must be positive, got {delta}"));
            }
        }
        if let Some(threshold) = self.threshold {
            if !(threshold.is_finite() && threshold > 0.0) {
                return Err(format!("--threshold must be positive, got {threshold}"));
            }
        }
        Ok(())
    }

    /// Get the log level based on verbosity flags.
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else if self.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        }
    }

    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(kind) = self.detector {
            config.detector.kind = kind;
        }
        if let Some(threshold) = self.threshold {
            config.detector.threshold = Some(threshold);
        }
        if let Some(delta) = self.delta {
            config.simulation.delta = delta;
        }
        if let Some(every_n) = self.every_n {
            config.simulation.every_n_sample = every_n;
        }
        if let Some(window_max) = self.window_max {
            config.simulation.window_max = window_max;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.no_anomalies {
            config.anomaly.enabled = false;
        }
    }
}
