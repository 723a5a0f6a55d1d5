//! Evaluation metrics comparing detector flags with injected ground truth.

use crate::core::Point;
use crate::error::{Result, StreamError};
use serde::Serialize;

/// Detection quality over a run of points.
///
/// Point-level counts compare `has_anomaly` with `result.is_anomaly` sample by
/// sample. Event-level counts treat each maximal run of consecutive injected
/// samples as one anomaly event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionMetrics {
    pub total: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
    /// Number of injected anomaly events.
    pub events: usize,
    /// Injected events with at least one flagged sample inside.
    pub events_detected: usize,
    /// Mean absolute error of the prediction on samples without injection.
    ///
    /// Samples inside an injected spike do not count. Non-finite errors are
    /// skipped; zero when no sample qualifies.
    pub mae: f64,
    /// Root mean squared error of the prediction, same samples as `mae`.
    pub rmse: f64,
}

impl DetectionMetrics {
    /// Compute metrics for a slice of points, oldest first.
    pub fn from_points(points: &[Point]) -> Result<Self> {
        let mut acc = MetricsAccumulator::new();
        acc.extend(points);
        acc.finish().ok_or(StreamError::EmptyData)
    }

    /// Number of flagged samples.
    pub fn flagged(&self) -> usize {
        self.true_positives + self.false_positives
    }

    /// Number of samples with an active injected spike.
    pub fn injected(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.flagged())
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.injected())
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total)
    }

    /// Share of injected events that were flagged at least once.
    pub fn event_recall(&self) -> f64 {
        ratio(self.events_detected, self.events)
    }
}

/// Running version of [`DetectionMetrics`] for points that arrive in batches.
///
/// An event that spans two batches is counted once.
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    total: usize,
    true_positives: usize,
    false_positives: usize,
    false_negatives: usize,
    true_negatives: usize,
    events: usize,
    events_detected: usize,
    in_event: bool,
    event_hit: bool,
    abs_err: f64,
    sq_err: f64,
    clean: usize,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: &Point) {
        self.total += 1;
        match (point.has_anomaly, point.result.is_anomaly) {
            (true, true) => self.true_positives += 1,
            (false, true) => self.false_positives += 1,
            (true, false) => self.false_negatives += 1,
            (false, false) => self.true_negatives += 1,
        }

        if point.has_anomaly {
            if !self.in_event {
                self.in_event = true;
                self.event_hit = false;
                self.events += 1;
            }
            self.event_hit |= point.result.is_anomaly;
            return;
        }

        self.close_event();
        let err = point.result.deviation(point.value);
        if err.is_finite() {
            self.abs_err += err.abs();
            self.sq_err += err * err;
            self.clean += 1;
        }
    }

    pub fn extend(&mut self, points: &[Point]) {
        for point in points {
            self.push(point);
        }
    }

    /// Samples seen so far.
    pub fn total(&self) -> usize {
        self.total
    }

    fn close_event(&mut self) {
        if self.in_event && self.event_hit {
            self.events_detected += 1;
        }
        self.in_event = false;
    }

    /// Final metrics, or `None` when no point was pushed.
    pub fn finish(mut self) -> Option<DetectionMetrics> {
        if self.total == 0 {
            return None;
        }
        self.close_event();

        let (mae, rmse) = if self.clean > 0 {
            let n = self.clean as f64;
            (self.abs_err / n, (self.sq_err / n).sqrt())
        } else {
            (0.0, 0.0)
        };

        Some(DetectionMetrics {
            total: self.total,
            true_positives: self.true_positives,
            false_positives: self.false_positives,
            false_negatives: self.false_negatives,
            true_negatives: self.true_negatives,
            events: self.events,
            events_detected: self.events_detected,
            mae,
            rmse,
        })
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DetectionResult;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn make_points(truth: &[bool], flags: &[bool]) -> Vec<Point> {
        let base = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        truth
            .iter()
            .zip(flags)
            .enumerate()
            .map(|(i, (&t, &f))| {
                Point::new(
                    base + Duration::hours(i as i64),
                    1.0,
                    t,
                    DetectionResult::new(1.0, 0.3, if f { 5.0 } else { 0.0 }, f),
                )
            })
            .collect()
    }

    #[test]
    fn empty_points_is_error() {
        assert_eq!(
            DetectionMetrics::from_points(&[]),
            Err(StreamError::EmptyData)
        );
    }

    #[test]
    fn confusion_counts() {
        let points = make_points(
            &[false, true, true, false, false, true],
            &[false, true, false, true, false, false],
        );
        let m = DetectionMetrics::from_points(&points).unwrap();

        assert_eq!(m.true_positives, 1);
        assert_eq!(m.false_positives, 1);
        assert_eq!(m.false_negatives, 2);
        assert_eq!(m.true_negatives, 2);
        assert_relative_eq!(m.precision(), 0.5);
        assert_relative_eq!(m.recall(), 1.0 / 3.0);
        assert_relative_eq!(m.f1(), 0.4);
        assert_relative_eq!(m.accuracy(), 0.5);
    }

    #[test]
    fn events_are_runs_of_injected_samples() {
        let points = make_points(
            &[true, true, false, true, true, true, false, true],
            &[false, true, false, false, false, false, false, true],
        );
        let m = DetectionMetrics::from_points(&points).unwrap();

        assert_eq!(m.events, 3);
        assert_eq!(m.events_detected, 2);
        assert_relative_eq!(m.event_recall(), 2.0 / 3.0);
    }

    #[test]
    fn undefined_ratios_are_zero() {
        let points = make_points(&[false, false], &[false, false]);
        let m = DetectionMetrics::from_points(&points).unwrap();

        assert_eq!(m.precision(), 0.0);
        assert_eq!(m.recall(), 0.0);
        assert_eq!(m.f1(), 0.0);
        assert_eq!(m.event_recall(), 0.0);
        assert_relative_eq!(m.accuracy(), 1.0);
    }

    #[test]
    fn prediction_error_skips_injected_samples() {
        let mut points = make_points(&[false, true, false], &[false, false, false]);
        points[0].value = 2.0;
        points[1].value = 50.0;
        points[2].value = 0.0;
        let m = DetectionMetrics::from_points(&points).unwrap();

        assert_relative_eq!(m.mae, 1.0);
        assert_relative_eq!(m.rmse, 1.0);
    }

    #[test]
    fn prediction_error_skips_non_finite() {
        let mut points = make_points(&[false, false], &[false, false]);
        points[0].value = 3.0;
        points[1].value = f64::INFINITY;
        let m = DetectionMetrics::from_points(&points).unwrap();

        assert_relative_eq!(m.mae, 2.0);
        assert_relative_eq!(m.rmse, 2.0);
    }

    #[test]
    fn batched_accumulation_matches_single_pass() {
        let points = make_points(
            &[false, true, true, true, false, true, true, false],
            &[false, false, false, true, false, false, false, true],
        );
        let whole = DetectionMetrics::from_points(&points).unwrap();

        let mut acc = MetricsAccumulator::new();
        for batch in points.chunks(3) {
            acc.extend(batch);
        }
        assert_eq!(acc.total(), points.len());
        let batched = acc.finish().unwrap();

        assert_eq!(batched, whole);
        // The first event crosses the batch boundary and still counts once.
        assert_eq!(batched.events, 2);
        assert_eq!(batched.events_detected, 1);
    }

    #[test]
    fn empty_accumulator_has_no_metrics() {
        assert!(MetricsAccumulator::new().finish().is_none());
    }
}
