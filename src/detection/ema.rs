//! Exponential moving average detector.

use super::{check_threshold, check_unit_interval, AnomalyDetector};
use crate::core::DetectionResult;
use crate::error::Result;

/// Floor for the standard deviation when the running variance collapses.
const MIN_STD: f64 = 1e-6;

/// Exponentially weighted mean and variance detector.
///
/// The state equations are:
/// `ema_t = α × x_t + (1-α) × ema_{t-1}`
/// `ema2_t = α × x_t² + (1-α) × ema2_{t-1}`
///
/// and the variance is `ema2_t - ema_t²`. No window is stored, but the
/// detector still adapts slowly to new trends.
///
/// See <https://en.wikipedia.org/wiki/Exponential_smoothing>.
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverageDetector {
    /// Smoothing parameter (0 < alpha <= 1).
    alpha: f64,
    threshold: f64,
    ema: Option<f64>,
    ema_squared: f64,
}

impl ExponentialMovingAverageDetector {
    /// Create a new EMA detector.
    ///
    /// # Arguments
    /// * `alpha` - Smoothing parameter (0 < alpha <= 1)
    /// * `threshold` - Z-score threshold
    pub fn new(alpha: f64, threshold: f64) -> Result<Self> {
        check_unit_interval("alpha", alpha, false)?;
        check_threshold(threshold)?;
        Ok(Self {
            alpha,
            threshold,
            ema: None,
            ema_squared: 0.0,
        })
    }

    /// Get the smoothing parameter.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Current smoothed level, if any reading was seen.
    pub fn level(&self) -> Option<f64> {
        self.ema
    }
}

impl Default for ExponentialMovingAverageDetector {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            threshold: 3.0,
            ema: None,
            ema_squared: 0.0,
        }
    }
}

impl AnomalyDetector for ExponentialMovingAverageDetector {
    /// The score is signed: negative when the reading is below the level.
    fn update(&mut self, reading: f64) -> DetectionResult {
        let Some(prev) = self.ema else {
            self.ema = Some(reading);
            self.ema_squared = reading * reading;
            return DetectionResult::neutral(reading);
        };

        let ema = self.alpha * reading + (1.0 - self.alpha) * prev;
        self.ema_squared = self.alpha * reading * reading + (1.0 - self.alpha) * self.ema_squared;
        self.ema = Some(ema);

        let variance = self.ema_squared - ema * ema;
        let std = if variance > 0.0 {
            variance.sqrt()
        } else {
            MIN_STD
        };

        let z = (reading - ema) / std;
        DetectionResult::new(ema, std * self.threshold, z, self.is_anomaly(z))
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn name(&self) -> &str {
        "EMA"
    }

    fn reset(&mut self) {
        self.ema = None;
        self.ema_squared = 0.0;
    }
}
