//! Detector selection and parameters.

use super::{
    AnomalyDetector, BoxedDetector, ExponentialMovingAverageDetector, MovingAverageDetector,
    PewmaDetector,
};
use crate::error::{Result, StreamError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available detector algorithms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Simple moving average over a sliding window.
    Sma,
    /// Exponential moving average.
    Ema,
    /// Probabilistic exponentially weighted moving average.
    #[default]
    Pewma,
}

impl DetectorKind {
    pub const ALL: [DetectorKind; 3] = [DetectorKind::Sma, DetectorKind::Ema, DetectorKind::Pewma];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Sma => "sma",
            DetectorKind::Ema => "ema",
            DetectorKind::Pewma => "pewma",
        }
    }

    /// Build a detector of this kind from the parameters in `config`.
    pub fn build(&self, config: &DetectorConfig) -> Result<BoxedDetector> {
        let detector: BoxedDetector = match self {
            DetectorKind::Sma => Box::new(MovingAverageDetector::new(
                config.sma.window_size,
                config.threshold.unwrap_or(config.sma.threshold),
            )?),
            DetectorKind::Ema => Box::new(ExponentialMovingAverageDetector::new(
                config.ema.alpha,
                config.threshold.unwrap_or(config.ema.threshold),
            )?),
            DetectorKind::Pewma => Box::new(
                PewmaDetector::builder()
                    .alpha(config.pewma.alpha)
                    .beta(config.pewma.beta)
                    .threshold(config.threshold.unwrap_or(config.pewma.threshold))
                    .training_steps(config.pewma.training_steps)
                    .build()?,
            ),
        };
        tracing::debug!(
            detector = detector.name(),
            threshold = detector.threshold(),
            "detector built"
        );
        Ok(detector)
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorKind {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sma" => Ok(DetectorKind::Sma),
            "ema" => Ok(DetectorKind::Ema),
            "pewma" => Ok(DetectorKind::Pewma),
            other => Err(StreamError::invalid(format!(
                "unknown detector '{other}', expected one of sma, ema, pewma"
            ))),
        }
    }
}

/// Detector section of the configuration.
///
/// Per-detector defaults are tuned presets for the default stream; `threshold`,
/// when set, overrides the threshold of whichever detector is selected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub kind: DetectorKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,

    #[serde(default)]
    pub sma: SmaParams,

    #[serde(default)]
    pub ema: EmaParams,

    #[serde(default)]
    pub pewma: PewmaParams,
}

impl DetectorConfig {
    pub fn build(&self) -> Result<BoxedDetector> {
        self.kind.build(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmaParams {
    #[serde(default = "default_sma_window")]
    pub window_size: usize,
    #[serde(default = "default_sma_threshold")]
    pub threshold: f64,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self {
            window_size: default_sma_window(),
            threshold: default_sma_threshold(),
        }
    }
}

fn default_sma_window() -> usize {
    150
}

fn default_sma_threshold() -> f64 {
    3.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmaParams {
    #[serde(default = "default_ema_alpha")]
    pub alpha: f64,
    #[serde(default = "default_ema_threshold")]
    pub threshold: f64,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self {
            alpha: default_ema_alpha(),
            threshold: default_ema_threshold(),
        }
    }
}

fn default_ema_alpha() -> f64 {
    0.03
}

fn default_ema_threshold() -> f64 {
    2.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PewmaParams {
    #[serde(default = "default_pewma_alpha")]
    pub alpha: f64,
    #[serde(default = "default_pewma_beta")]
    pub beta: f64,
    #[serde(default = "default_pewma_threshold")]
    pub threshold: f64,
    #[serde(default = "default_pewma_training")]
    pub training_steps: usize,
}

impl Default for PewmaParams {
    fn default() -> Self {
        Self {
            alpha: default_pewma_alpha(),
            beta: default_pewma_beta(),
            threshold: default_pewma_threshold(),
            training_steps: default_pewma_training(),
        }
    }
}

fn default_pewma_alpha() -> f64 {
    0.95
}

fn default_pewma_beta() -> f64 {
    0.06
}

fn default_pewma_threshold() -> f64 {
    3.2
}

fn default_pewma_training() -> usize {
    100
}
