//! Sliding-window moving average detector.

use super::{check_threshold, AnomalyDetector};
use crate::core::DetectionResult;
use crate::error::{Result, StreamError};
use crate::utils::stats::{mean, population_std_dev};
use std::collections::VecDeque;

/// Flags readings whose z-score against the last `window_size` readings
/// exceeds the threshold.
///
/// The window includes the current reading. Simple and easy to reason about,
/// but it needs memory for the window and adapts slowly to trend changes.
///
/// # Example
/// ```
/// use anofox_stream::detection::{AnomalyDetector, MovingAverageDetector};
///
/// let mut detector = MovingAverageDetector::new(20, 3.0).unwrap();
/// for i in 0..50 {
///     detector.update(10.0 + 0.1 * (i % 3) as f64);
/// }
/// assert!(detector.update(25.0).is_anomaly);
/// ```
#[derive(Debug, Clone)]
pub struct MovingAverageDetector {
    window_size: usize,
    threshold: f64,
    window: VecDeque<f64>,
}

impl MovingAverageDetector {
    /// Create a detector with the given window size and z-score threshold.
    pub fn new(window_size: usize, threshold: f64) -> Result<Self> {
        if window_size == 0 {
            return Err(StreamError::invalid("window_size must be at least 1"));
        }
        check_threshold(threshold)?;
        Ok(Self {
            window_size,
            threshold,
            window: VecDeque::with_capacity(window_size),
        })
    }

    /// Get the window size.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of readings currently held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

impl Default for MovingAverageDetector {
    fn default() -> Self {
        Self {
            window_size: 100,
            threshold: 3.0,
            window: VecDeque::with_capacity(100),
        }
    }
}

impl AnomalyDetector for MovingAverageDetector {
    fn update(&mut self, reading: f64) -> DetectionResult {
        self.window.push_back(reading);
        if self.window.len() > self.window_size {
            self.window.pop_front();
        }

        let values = self.window.make_contiguous();
        let m = mean(values);
        let std = population_std_dev(values);

        if std == 0.0 {
            return DetectionResult::neutral(m);
        }

        let z = (reading - m) / std;
        DetectionResult::new(m, std * self.threshold, z, self.is_anomaly(z))
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn name(&self) -> &str {
        "SMA"
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}
