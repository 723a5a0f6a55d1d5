//! Report generation for simulation runs.
//!
//! Supports three output formats: CSV (one row per point), JSON (run metadata,
//! metrics and points) and a human-readable summary.

mod writer;

pub use writer::{write_csv, write_json, write_report, write_summary, CsvRecord};

use crate::core::Point;
use crate::simulation::SimulationManager;
use crate::utils::DetectionMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One row per point.
    Csv,
    /// Run metadata, metrics and all points.
    Json,
    /// Human-readable metrics.
    #[default]
    Summary,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "summary" | "text" => Ok(OutputFormat::Summary),
            _ => Err(format!(
                "Invalid format: {}. Use 'csv', 'json' or 'summary'",
                s
            )),
        }
    }
}

/// Everything produced by one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub detector: String,
    pub generator: String,
    pub injector: String,
    /// Total samples generated.
    pub steps: usize,
    /// Simulated hours covered by the run.
    pub elapsed_hours: f64,
    /// Absent when the run produced no points.
    pub metrics: Option<DetectionMetrics>,
    /// The retained window, at most `window_max` points.
    pub points: Vec<Point>,
}

impl Report {
    /// Assemble a report from the window of `sim` and metrics gathered over
    /// the whole run.
    pub fn new(sim: &SimulationManager, metrics: Option<DetectionMetrics>) -> Self {
        Self {
            detector: sim.detector_name().to_string(),
            generator: sim.generator_name().to_string(),
            injector: sim.injector_name().to_string(),
            steps: sim.steps(),
            elapsed_hours: sim.elapsed_hours(),
            metrics,
            points: sim.window().to_vec(),
        }
    }

    /// Report with metrics computed over the retained window only.
    pub fn from_window(sim: &SimulationManager) -> Self {
        let metrics = DetectionMetrics::from_points(sim.window()).ok();
        Self::new(sim, metrics)
    }
}
