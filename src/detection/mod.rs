//! Streaming anomaly detectors.
//!
//! Every detector consumes one reading at a time, predicts the expected value
//! for it and scores the reading as a z-score against its running spread:
//! - `MovingAverageDetector`: sliding-window mean and standard deviation
//! - `ExponentialMovingAverageDetector`: exponentially weighted mean and variance
//! - `PewmaDetector`: probabilistic EWMA that discounts surprising readings

mod ema;
mod kind;
mod moving_average;
mod pewma;

pub use ema::ExponentialMovingAverageDetector;
pub use kind::{DetectorConfig, DetectorKind, EmaParams, PewmaParams, SmaParams};
pub use moving_average::MovingAverageDetector;
pub use pewma::{PewmaBuilder, PewmaDetector};

use crate::core::DetectionResult;
use crate::error::{Result, StreamError};

/// Common interface for streaming anomaly detectors.
///
/// This trait is object-safe and can be used with `Box<dyn AnomalyDetector>`.
pub trait AnomalyDetector {
    /// Feed a new reading and return the detection result for it.
    fn update(&mut self, reading: f64) -> DetectionResult;

    /// Z-score threshold above which a reading is anomalous.
    fn threshold(&self) -> f64;

    /// Check whether the given z-score is an anomaly.
    fn is_anomaly(&self, score: f64) -> bool {
        score.abs() > self.threshold()
    }

    /// Get the detector name.
    fn name(&self) -> &str;

    /// Forget all readings seen so far.
    fn reset(&mut self);
}

/// Type alias for boxed detector trait objects.
///
/// # Example
///
/// ```
/// use anofox_stream::detection::{AnomalyDetector, BoxedDetector, PewmaDetector};
///
/// let detector: BoxedDetector = Box::new(PewmaDetector::default());
/// assert_eq!(detector.name(), "PEWMA");
/// ```
pub type BoxedDetector = Box<dyn AnomalyDetector + Send>;

pub(crate) fn check_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(StreamError::invalid(format!(
            "threshold must be positive, got {threshold}"
        )));
    }
    Ok(())
}

pub(crate) fn check_unit_interval(name: &str, value: f64, allow_zero: bool) -> Result<()> {
    let low_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if !(low_ok && value <= 1.0) {
        let bound = if allow_zero { "[0, 1]" } else { "(0, 1]" };
        return Err(StreamError::invalid(format!(
            "{name} must be in {bound}, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_detectors() -> Vec<BoxedDetector> {
        vec![
            Box::new(MovingAverageDetector::default()),
            Box::new(ExponentialMovingAverageDetector::default()),
            Box::new(PewmaDetector::default()),
        ]
    }

    #[test]
    fn names() {
        let names: Vec<String> = all_detectors().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, vec!["SMA", "EMA", "PEWMA"]);
    }

    #[test]
    fn first_reading_is_never_anomalous() {
        for mut detector in all_detectors() {
            let result = detector.update(42.0);
            assert!(!result.is_anomaly, "{}", detector.name());
            assert_eq!(result.score, 0.0, "{}", detector.name());
        }
    }

    #[test]
    fn is_anomaly_uses_absolute_score() {
        for detector in all_detectors() {
            assert!(detector.is_anomaly(3.5));
            assert!(detector.is_anomaly(-3.5));
            assert!(!detector.is_anomaly(2.9));
            assert!(!detector.is_anomaly(3.0));
        }
    }

    #[test]
    fn reset_restores_initial_behaviour() {
        for mut detector in all_detectors() {
            for i in 0..200 {
                detector.update((i as f64 * 0.3).sin());
            }
            detector.reset();
            let result = detector.update(100.0);
            assert!(!result.is_anomaly, "{}", detector.name());
            assert_eq!(result.expected_value, 100.0, "{}", detector.name());
        }
    }

    #[test]
    fn validation_helpers() {
        assert!(check_threshold(3.0).is_ok());
        assert!(check_threshold(0.0).is_err());
        assert!(check_threshold(f64::NAN).is_err());

        assert!(check_unit_interval("alpha", 1.0, false).is_ok());
        assert!(check_unit_interval("alpha", 0.0, false).is_err());
        assert!(check_unit_interval("beta", 0.0, true).is_ok());
        assert!(check_unit_interval("beta", 1.5, true).is_err());
    }
}
