//! Simulation manager driving generator, injector and detector in lockstep.

use crate::anomaly::{AnomalyInjector, BoxedInjector, SpikeInjector};
use crate::core::{DetectionResult, Point};
use crate::detection::{AnomalyDetector, BoxedDetector, PewmaDetector};
use crate::error::{Result, StreamError};
use crate::generator::{BoxedGenerator, SinusoidalGenerator, StreamGenerator};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Timing and retention settings of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Maximum number of points kept in the window.
    #[serde(default = "default_window_max")]
    pub window_max: usize,

    /// Time between samples in hours.
    #[serde(default = "default_delta")]
    pub delta: f64,

    /// Feed the detector every n-th sample only; other samples reuse the last result.
    #[serde(default = "default_every_n_sample")]
    pub every_n_sample: usize,

    /// Timestamp of the first sample.
    #[serde(default = "default_start_time")]
    pub start_time: DateTime<Utc>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            window_max: default_window_max(),
            delta: default_delta(),
            every_n_sample: default_every_n_sample(),
            start_time: default_start_time(),
        }
    }
}

fn default_window_max() -> usize {
    2000
}

fn default_delta() -> f64 {
    2.0
}

fn default_every_n_sample() -> usize {
    1
}

fn default_start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_max == 0 {
            return Err(StreamError::invalid("window_max must be at least 1"));
        }
        if !self.delta.is_finite() || self.delta <= 0.0 {
            return Err(StreamError::invalid(format!(
                "delta must be a positive number of hours, got {}",
                self.delta
            )));
        }
        if self.every_n_sample == 0 {
            return Err(StreamError::invalid("every_n_sample must be at least 1"));
        }
        Ok(())
    }
}

/// Runs a stream generator, an anomaly injector and a detector on a shared clock.
///
/// Each step draws a clean sample, adds the injector's offset and, on every
/// `every_n_sample`-th step, feeds the result to the detector. The most recent
/// `window_max` points are retained.
///
/// # Example
/// ```
/// use anofox_stream::simulation::SimulationManager;
///
/// let mut sim = SimulationManager::default();
/// let window = sim.step(10)?;
/// assert_eq!(window.len(), 10);
/// assert_eq!(sim.steps(), 10);
/// # Ok::<(), anofox_stream::StreamError>(())
/// ```
pub struct SimulationManager {
    config: SimulationConfig,
    generator: BoxedGenerator,
    injector: BoxedInjector,
    detector: BoxedDetector,
    window: Vec<Point>,
    last_detection: Option<DetectionResult>,
    steps: usize,
    t: f64,
}

impl SimulationManager {
    /// Create a manager from explicit components.
    pub fn new(
        config: SimulationConfig,
        generator: BoxedGenerator,
        injector: BoxedInjector,
        detector: BoxedDetector,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            window: Vec::with_capacity(config.window_max.min(1 << 16)),
            config,
            generator,
            injector,
            detector,
            last_detection: None,
            steps: 0,
            t: 0.0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Points retained so far, oldest first.
    pub fn window(&self) -> &[Point] {
        &self.window
    }

    /// Total samples generated.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Simulated hours since start.
    pub fn elapsed_hours(&self) -> f64 {
        self.t
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub fn injector_name(&self) -> &str {
        self.injector.name()
    }

    /// Drop all retained points without touching the stream state.
    pub fn reset_window(&mut self) {
        self.window.clear();
    }

    fn timestamp_at(&self, hours: f64) -> Result<DateTime<Utc>> {
        let millis = (hours * 3_600_000.0).round();
        // `as` saturates, so range-check before converting.
        let offset = if millis.abs() < i64::MAX as f64 {
            TimeDelta::try_milliseconds(millis as i64)
        } else {
            None
        };
        offset
            .and_then(|offset| self.config.start_time.checked_add_signed(offset))
            .ok_or(StreamError::ClockOverflow { hours })
    }

    fn next_point(&mut self) -> Result<Point> {
        let timestamp = self.timestamp_at(self.t)?;
        let delta = self.config.delta;
        let mut value = self.generator.next_value(delta);
        let injection = self.injector.inject(delta);
        value += injection.offset;

        let result = if self.steps % self.config.every_n_sample == 0 {
            let result = self.detector.update(value);
            self.last_detection = Some(result);
            result
        } else {
            self.last_detection.unwrap_or_default()
        };

        let point = Point::new(timestamp, value, injection.active, result);
        self.t += delta;
        self.steps += 1;
        Ok(point)
    }

    /// Generate `n` samples and return only the new points.
    ///
    /// The new points are also appended to the window, which is then trimmed
    /// to `window_max`.
    ///
    /// # Errors
    /// `ClockOverflow` once a timestamp falls outside the representable range.
    /// Samples generated before that point stay in the window and the clock
    /// does not move past it.
    pub fn advance(&mut self, n: usize) -> Result<Vec<Point>> {
        let mut points = Vec::with_capacity(n.min(self.config.window_max));
        let mut failure = None;
        for _ in 0..n {
            match self.next_point() {
                Ok(point) => points.push(point),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        self.window.extend_from_slice(&points);
        if self.window.len() > self.config.window_max {
            let excess = self.window.len() - self.config.window_max;
            self.window.drain(..excess);
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(points),
        }
    }

    /// Advance the simulation by `n` samples and return the whole retained window.
    pub fn step(&mut self, n: usize) -> Result<&[Point]> {
        self.advance(n)?;
        Ok(&self.window)
    }

    /// Generate `total` samples in batches of `batch_size`, handing each batch
    /// of new points to `on_batch`.
    ///
    /// Stops at the first error returned by the callback.
    pub fn run<F>(&mut self, total: usize, batch_size: usize, mut on_batch: F) -> Result<()>
    where
        F: FnMut(&[Point]) -> Result<()>,
    {
        if batch_size == 0 {
            return Err(StreamError::invalid("batch_size must be at least 1"));
        }

        let mut remaining = total;
        while remaining > 0 {
            let n = remaining.min(batch_size);
            let points = self.advance(n)?;
            remaining -= n;

            let flagged = points.iter().filter(|p| p.is_flagged()).count();
            let injected = points.iter().filter(|p| p.has_anomaly).count();
            info!(
                steps = self.steps,
                hours = self.t,
                flagged,
                injected,
                "batch complete"
            );
            debug!(detector = self.detector.name(), window = self.window.len(), "window updated");

            on_batch(points.as_slice())?;
        }
        Ok(())
    }
}

impl Default for SimulationManager {
    /// PEWMA detector on the default sinusoidal stream with randomized spikes.
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            generator: Box::new(SinusoidalGenerator::default()),
            injector: Box::new(SpikeInjector::default()),
            detector: Box::new(PewmaDetector::default()),
            window: Vec::new(),
            last_detection: None,
            steps: 0,
            t: 0.0,
        }
    }
}

impl std::fmt::Debug for SimulationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationManager")
            .field("config", &self.config)
            .field("generator", &self.generator.name())
            .field("injector", &self.injector.name())
            .field("detector", &self.detector.name())
            .field("window", &self.window.len())
            .field("steps", &self.steps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::{Injection, NoInjection};
    use crate::detection::MovingAverageDetector;
    use approx::assert_relative_eq;
    use chrono::Duration;

    /// Detector that counts calls and echoes the reading.
    struct Recorder {
        calls: usize,
    }

    impl AnomalyDetector for Recorder {
        fn update(&mut self, reading: f64) -> DetectionResult {
            self.calls += 1;
            DetectionResult::new(reading, self.calls as f64, 0.0, false)
        }

        fn threshold(&self) -> f64 {
            1.0
        }

        fn name(&self) -> &str {
            "Recorder"
        }

        fn reset(&mut self) {
            self.calls = 0;
        }
    }

    /// Injector that is active on every sample with a fixed offset.
    struct Constant(f64);

    impl AnomalyInjector for Constant {
        fn inject(&mut self, _delta: f64) -> Injection {
            Injection::active(self.0)
        }

        fn name(&self) -> &str {
            "Constant"
        }
    }

    fn quiet_generator() -> BoxedGenerator {
        Box::new(
            SinusoidalGenerator::builder()
                .noise_std(0.0)
                .build()
                .unwrap(),
        )
    }

    fn make_sim(config: SimulationConfig) -> SimulationManager {
        SimulationManager::new(
            config,
            quiet_generator(),
            Box::new(NoInjection),
            Box::new(Recorder { calls: 0 }),
        )
        .unwrap()
    }

    #[test]
    fn window_is_trimmed_to_max() {
        let mut sim = make_sim(SimulationConfig {
            window_max: 25,
            ..Default::default()
        });

        assert_eq!(sim.step(10).unwrap().len(), 10);
        assert_eq!(sim.step(30).unwrap().len(), 25);
        assert_eq!(sim.steps(), 40);

        // Oldest retained point is sample 15.
        let first = &sim.window()[0];
        assert_eq!(
            first.timestamp,
            sim.config().start_time + Duration::hours(2 * 15)
        );
    }

    #[test]
    fn timestamps_start_at_start_time() {
        let mut sim = make_sim(SimulationConfig {
            delta: 0.5,
            ..Default::default()
        });
        let window = sim.step(3).unwrap();

        let start = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(window[0].timestamp, start);
        assert_eq!(window[1].timestamp, start + Duration::minutes(30));
        assert_eq!(window[2].timestamp, start + Duration::hours(1));
        assert_relative_eq!(sim.elapsed_hours(), 1.5);
    }

    #[test]
    fn values_follow_generator_clock() {
        let reference = SinusoidalGenerator::builder()
            .noise_std(0.0)
            .build()
            .unwrap();
        let mut sim = make_sim(SimulationConfig::default());
        let window = sim.step(5).unwrap();

        // The generator advances before producing, so sample i is at (i + 1) * delta.
        for (i, point) in window.iter().enumerate() {
            assert_relative_eq!(
                point.value,
                reference.expected_at(2.0 * (i + 1) as f64),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn subsampling_reuses_last_result() {
        let mut sim = make_sim(SimulationConfig {
            every_n_sample: 4,
            ..Default::default()
        });
        let window = sim.step(9).unwrap();

        // Detector ran on steps 0, 4 and 8.
        let calls: Vec<f64> = window.iter().map(|p| p.result.safe_distance).collect();
        assert_eq!(calls, vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 3.0]);
        assert_eq!(window[3].result, window[0].result);
    }

    #[test]
    fn injection_offsets_value_and_labels_point() {
        let mut sim = SimulationManager::new(
            SimulationConfig::default(),
            quiet_generator(),
            Box::new(Constant(5.0)),
            Box::new(Recorder { calls: 0 }),
        )
        .unwrap();
        let reference = SinusoidalGenerator::builder()
            .noise_std(0.0)
            .build()
            .unwrap();

        let window = sim.step(3).unwrap();
        for (i, point) in window.iter().enumerate() {
            assert!(point.has_anomaly);
            assert_relative_eq!(
                point.value,
                reference.expected_at(2.0 * (i + 1) as f64) + 5.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn run_reports_every_batch() {
        let mut sim = make_sim(SimulationConfig::default());
        let mut sizes = Vec::new();
        sim.run(23, 10, |batch| {
            sizes.push(batch.len());
            Ok(())
        })
        .unwrap();

        assert_eq!(sizes, vec![10, 10, 3]);
        assert_eq!(sim.steps(), 23);
    }

    #[test]
    fn run_stops_on_callback_error() {
        let mut sim = make_sim(SimulationConfig::default());
        let mut calls = 0;
        let result = sim.run(100, 10, |_| {
            calls += 1;
            Err(StreamError::Io("closed".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
        assert_eq!(sim.steps(), 10);
    }

    #[test]
    fn run_rejects_zero_batch() {
        let mut sim = make_sim(SimulationConfig::default());
        assert!(sim.run(10, 0, |_| Ok(())).is_err());
    }

    #[test]
    fn invalid_config_is_rejected() {
        for config in [
            SimulationConfig {
                window_max: 0,
                ..Default::default()
            },
            SimulationConfig {
                delta: 0.0,
                ..Default::default()
            },
            SimulationConfig {
                delta: f64::INFINITY,
                ..Default::default()
            },
            SimulationConfig {
                every_n_sample: 0,
                ..Default::default()
            },
        ] {
            let result = SimulationManager::new(
                config,
                quiet_generator(),
                Box::new(NoInjection),
                Box::new(MovingAverageDetector::default()),
            );
            assert!(matches!(result, Err(StreamError::InvalidParameter(_))));
        }
    }

    #[test]
    fn default_manager_uses_pewma() {
        let sim = SimulationManager::default();
        assert_eq!(sim.detector_name(), "PEWMA");
        assert_eq!(sim.generator_name(), "Sinusoidal");
        assert_eq!(sim.injector_name(), "RandomizedSpike");
        assert_eq!(sim.config().window_max, 2000);
    }

    #[test]
    fn reset_window_keeps_clock() {
        let mut sim = make_sim(SimulationConfig::default());
        sim.step(5).unwrap();
        sim.reset_window();
        assert!(sim.window().is_empty());
        assert_eq!(sim.step(1).unwrap().len(), 1);
        assert_eq!(sim.steps(), 6);
    }

    #[test]
    fn clock_overflow_is_an_error() {
        let config = SimulationConfig {
            delta: 1e10,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        let mut sim = make_sim(config);

        let result = sim.step(3);
        assert!(matches!(result, Err(StreamError::ClockOverflow { .. })));
        // The first sample sits at start_time and is kept.
        assert_eq!(sim.window().len(), 1);
        assert_eq!(sim.steps(), 1);

        // The clock stays put, so retrying fails the same way.
        assert!(sim.step(1).is_err());
        assert_eq!(sim.steps(), 1);
    }

    #[test]
    fn huge_delta_does_not_saturate() {
        let mut sim = make_sim(SimulationConfig {
            delta: f64::MAX,
            ..Default::default()
        });
        assert!(sim.run(10, 5, |_| Ok(())).is_err());
        assert_eq!(sim.steps(), 1);
    }
}
