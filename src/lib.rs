//! # anofox-stream
//!
//! Streaming anomaly detection for synthetic periodic time series.
//!
//! Generates a seasonal sinusoidal stream with Gaussian noise, injects
//! randomized triangular spikes, and runs a streaming detector (moving
//! average, exponential moving average or PEWMA) that predicts the expected
//! value of each sample and flags readings that deviate from it.

pub mod anomaly;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod generator;
pub mod report;
pub mod simulation;
pub mod utils;

pub use error::{Result, StreamError};

pub mod prelude {
    pub use crate::anomaly::{AnomalyInjector, NoInjection, SpikeInjector};
    pub use crate::config::Config;
    pub use crate::core::{DetectionResult, Point};
    pub use crate::detection::{AnomalyDetector, BoxedDetector, DetectorKind};
    pub use crate::error::{Result, StreamError};
    pub use crate::generator::{SinusoidalGenerator, StreamGenerator};
    pub use crate::simulation::{SimulationConfig, SimulationManager};
    pub use crate::utils::DetectionMetrics;
}
