//! Detection result produced for every reading fed to a detector.

use serde::Serialize;

/// Outcome of feeding a single reading to an anomaly detector.
///
/// The normal band around the prediction is
/// `[expected_value - safe_distance, expected_value + safe_distance]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DetectionResult {
    /// Value the detector expected for this reading.
    pub expected_value: f64,
    /// Half-width of the normal band (standard deviation times threshold).
    pub safe_distance: f64,
    /// Signed z-score of the reading relative to the expected value.
    pub score: f64,
    /// Whether the reading was flagged.
    pub is_anomaly: bool,
}

impl DetectionResult {
    pub fn new(expected_value: f64, safe_distance: f64, score: f64, is_anomaly: bool) -> Self {
        Self {
            expected_value,
            safe_distance,
            score,
            is_anomaly,
        }
    }

    /// A non-anomalous result centred on `expected_value` with an empty band.
    pub fn neutral(expected_value: f64) -> Self {
        Self::new(expected_value, 0.0, 0.0, false)
    }

    /// Upper edge of the normal band.
    pub fn upper_bound(&self) -> f64 {
        self.expected_value + self.safe_distance
    }

    /// Lower edge of the normal band.
    pub fn lower_bound(&self) -> f64 {
        self.expected_value - self.safe_distance
    }

    /// Distance between `value` and the expected value.
    pub fn deviation(&self, value: f64) -> f64 {
        value - self.expected_value
    }
}
