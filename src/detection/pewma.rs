//! Probabilistic exponentially weighted moving average (PEWMA) detector.
//!
//! Reference: Carter, K. M., & Streilein, W. W. (2012). Probabilistic
//! reasoning for streaming anomaly detection. IEEE Statistical Signal
//! Processing Workshop (SSP), 377-380.

use super::{check_threshold, check_unit_interval, AnomalyDetector};
use crate::core::DetectionResult;
use crate::error::{Result, StreamError};
use crate::utils::stats::normal_pdf;

/// PEWMA anomaly detector.
///
/// The smoothing weight is modulated by the probability of the current
/// reading under the running normal model:
/// `α_t = (1 - β × p_t) × α`, with `p_t = φ(z_t)`.
/// Surprising readings (small `p_t`) barely move the estimate, so a spike
/// does not drag the baseline with it.
///
/// For the first `training_steps` readings the weight is `1 - 1/t`, which
/// makes the moments plain running averages, and nothing is flagged.
///
/// # Example
/// ```
/// use anofox_stream::detection::{AnomalyDetector, PewmaDetector};
///
/// let mut detector = PewmaDetector::builder()
///     .alpha(0.95)
///     .beta(0.06)
///     .threshold(3.2)
///     .training_steps(20)
///     .build()
///     .unwrap();
///
/// for i in 0..100 {
///     detector.update(1.0 + 0.05 * (i as f64).sin());
/// }
/// assert!(detector.update(3.0).is_anomaly);
/// ```
#[derive(Debug, Clone)]
pub struct PewmaDetector {
    alpha: f64,
    beta: f64,
    threshold: f64,
    training_steps: usize,
    steps: usize,
    /// First moment estimate.
    s1: f64,
    /// Second moment estimate.
    s2: f64,
}

/// Builder for PewmaDetector.
#[derive(Debug, Clone)]
pub struct PewmaBuilder {
    alpha: f64,
    beta: f64,
    threshold: f64,
    training_steps: usize,
}

impl Default for PewmaBuilder {
    fn default() -> Self {
        Self {
            alpha: 0.97,
            beta: 0.99,
            threshold: 3.0,
            training_steps: 50,
        }
    }
}

impl PewmaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of the history (0 < alpha <= 1).
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Weight of the probability adjustment (0 <= beta <= 1).
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Readings consumed before the detector may flag anything.
    pub fn training_steps(mut self, steps: usize) -> Self {
        self.training_steps = steps;
        self
    }

    pub fn build(self) -> Result<PewmaDetector> {
        check_unit_interval("alpha", self.alpha, false)?;
        check_unit_interval("beta", self.beta, true)?;
        check_threshold(self.threshold)?;
        if self.training_steps == 0 {
            return Err(StreamError::invalid("training_steps must be at least 1"));
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> PewmaDetector {
        PewmaDetector {
            alpha: self.alpha,
            beta: self.beta,
            threshold: self.threshold,
            training_steps: self.training_steps,
            steps: 0,
            s1: 0.0,
            s2: 0.0,
        }
    }
}

impl PewmaDetector {
    /// Create a PEWMA detector with explicit parameters.
    pub fn new(alpha: f64, beta: f64, threshold: f64, training_steps: usize) -> Result<Self> {
        Self::builder()
            .alpha(alpha)
            .beta(beta)
            .threshold(threshold)
            .training_steps(training_steps)
            .build()
    }

    /// Create a builder for more complex configuration.
    pub fn builder() -> PewmaBuilder {
        PewmaBuilder::new()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn training_steps(&self) -> usize {
        self.training_steps
    }

    /// Readings consumed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Whether the training phase is over.
    pub fn is_trained(&self) -> bool {
        self.steps >= self.training_steps
    }

    /// Current standard deviation estimate from the two moments.
    fn std_estimate(&self) -> f64 {
        (self.s2 - self.s1 * self.s1).max(0.0).sqrt()
    }
}

impl Default for PewmaDetector {
    fn default() -> Self {
        PewmaBuilder::default().assemble()
    }
}

impl AnomalyDetector for PewmaDetector {
    fn update(&mut self, reading: f64) -> DetectionResult {
        self.steps += 1;

        if self.steps == 1 {
            self.s1 = reading;
            self.s2 = reading * reading;
        }

        // Prediction and spread come from the state before this reading.
        let mean = self.s1;
        let std = self.std_estimate();
        let z = if std == 0.0 { 0.0 } else { (reading - mean) / std };
        let p = normal_pdf(z);

        let alpha_t = if self.steps < self.training_steps {
            1.0 - 1.0 / self.steps as f64
        } else {
            (1.0 - self.beta * p) * self.alpha
        };

        self.s1 = alpha_t * self.s1 + (1.0 - alpha_t) * reading;
        self.s2 = alpha_t * self.s2 + (1.0 - alpha_t) * reading * reading;

        let flagged = self.is_trained() && self.is_anomaly(z);
        DetectionResult::new(self.s1, std * self.threshold, z, flagged)
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn name(&self) -> &str {
        "PEWMA"
    }

    fn reset(&mut self) {
        self.steps = 0;
        self.s1 = 0.0;
        self.s2 = 0.0;
    }
}
