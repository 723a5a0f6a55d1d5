//! A single sample of the simulated stream.

use super::DetectionResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One observation of the stream together with its detection outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    /// Wall-clock time of the sample.
    pub timestamp: DateTime<Utc>,
    /// Observed value (signal, noise and any injected spike).
    pub value: f64,
    /// Ground truth: an injected spike was active for this sample.
    pub has_anomaly: bool,
    /// Detector output in effect for this sample.
    pub result: DetectionResult,
}

impl Point {
    pub fn new(
        timestamp: DateTime<Utc>,
        value: f64,
        has_anomaly: bool,
        result: DetectionResult,
    ) -> Self {
        Self {
            timestamp,
            value,
            has_anomaly,
            result,
        }
    }

    /// Whether the detector flagged this sample.
    pub fn is_flagged(&self) -> bool {
        self.result.is_anomaly
    }

    pub fn is_true_positive(&self) -> bool {
        self.has_anomaly && self.result.is_anomaly
    }

    pub fn is_false_positive(&self) -> bool {
        !self.has_anomaly && self.result.is_anomaly
    }

    pub fn is_false_negative(&self) -> bool {
        self.has_anomaly && !self.result.is_anomaly
    }

    /// Whether the observed value lies outside the detector's normal band.
    pub fn outside_band(&self) -> bool {
        self.value > self.result.upper_bound() || self.value < self.result.lower_bound()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_point(has_anomaly: bool, flagged: bool) -> Point {
        let ts = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        Point::new(ts, 3.0, has_anomaly, DetectionResult::new(2.0, 0.5, 4.0, flagged))
    }

    #[test]
    fn confusion_helpers() {
        assert!(make_point(true, true).is_true_positive());
        assert!(make_point(false, true).is_false_positive());
        assert!(make_point(true, false).is_false_negative());

        let quiet = make_point(false, false);
        assert!(!quiet.is_true_positive());
        assert!(!quiet.is_false_positive());
        assert!(!quiet.is_false_negative());
    }

    #[test]
    fn outside_band_uses_result_bounds() {
        let point = make_point(false, false);
        assert!(point.outside_band());

        let mut inside = point.clone();
        inside.value = 2.2;
        assert!(!inside.outside_band());
    }

    #[test]
    fn serializes_with_rfc3339_timestamp() {
        let json = serde_json::to_string(&make_point(true, true)).unwrap();
        assert!(json.contains("\"timestamp\":\"2001-01-01T00:00:00Z\""));
        assert!(json.contains("\"has_anomaly\":true"));
    }
}
