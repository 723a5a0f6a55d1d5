//! Utility functions shared by detectors and reports.

pub mod metrics;
pub mod stats;

pub use metrics::{DetectionMetrics, MetricsAccumulator};
pub use stats::{mean, normal_pdf, population_std_dev};
