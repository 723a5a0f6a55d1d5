//! Randomized triangular spikes.

use super::{AnomalyInjector, Injection};
use crate::error::{Result, StreamError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Adds triangular spikes of random sign, height and duration at random times.
///
/// Each spike ramps linearly from zero to its peak at half its duration and
/// back to zero. The quiet gap before the next spike is measured from the end
/// of the previous one.
///
/// # Example
/// ```
/// use anofox_stream::anomaly::{AnomalyInjector, SpikeInjector};
///
/// let mut injector = SpikeInjector::builder()
///     .gap(10.0, 10.0)
///     .duration(4.0, 4.0)
///     .amplitude(1.0, 1.0)
///     .seed(3)
///     .build()
///     .unwrap();
///
/// let active = (0..40).filter(|_| injector.inject(1.0).active).count();
/// assert!(active > 0);
/// ```
#[derive(Debug, Clone)]
pub struct SpikeInjector {
    gap: (f64, f64),
    duration: (f64, f64),
    amplitude: (f64, f64),
    rng: StdRng,
    t: f64,
    /// Start of the current spike, or end of the last one while idle.
    last_event: f64,
    next_gap: f64,
    spike_duration: f64,
    spike_amp: f64,
    applying: bool,
}

/// Builder for SpikeInjector.
///
/// Ranges are `(min, max)` pairs; times are in hours.
#[derive(Debug, Clone)]
pub struct SpikeBuilder {
    gap: (f64, f64),
    duration: (f64, f64),
    amplitude: (f64, f64),
    seed: Option<u64>,
}

impl Default for SpikeBuilder {
    fn default() -> Self {
        Self {
            gap: (5.0 * 24.0, 80.0 * 24.0),
            duration: (6.0, 2.0 * 24.0),
            amplitude: (0.8, 2.6),
            seed: None,
        }
    }
}

impl SpikeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Range of quiet time between spikes.
    pub fn gap(mut self, min: f64, max: f64) -> Self {
        self.gap = (min, max);
        self
    }

    /// Range of spike durations.
    pub fn duration(mut self, min: f64, max: f64) -> Self {
        self.duration = (min, max);
        self
    }

    /// Range of absolute peak heights. The sign is chosen at random.
    pub fn amplitude(mut self, min: f64, max: f64) -> Self {
        self.amplitude = (min, max);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<SpikeInjector> {
        check_range("gap", self.gap)?;
        check_range("duration", self.duration)?;
        check_range("amplitude", self.amplitude)?;
        if self.duration.0 <= 0.0 {
            return Err(StreamError::invalid("spike duration must be positive"));
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> SpikeInjector {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut injector = SpikeInjector {
            gap: self.gap,
            duration: self.duration,
            amplitude: self.amplitude,
            rng,
            t: 0.0,
            last_event: 0.0,
            next_gap: 0.0,
            spike_duration: 0.0,
            spike_amp: 0.0,
            applying: false,
        };
        injector.next_gap = injector.draw(injector.gap);
        injector
    }
}

fn check_range(label: &str, (min, max): (f64, f64)) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(StreamError::invalid(format!("{label} range must be finite")));
    }
    if min < 0.0 {
        return Err(StreamError::invalid(format!(
            "{label} minimum must be non-negative"
        )));
    }
    if min > max {
        return Err(StreamError::invalid(format!(
            "{label} minimum {min} exceeds maximum {max}"
        )));
    }
    Ok(())
}

impl SpikeInjector {
    /// Create an injector with default ranges and an entropy-seeded source.
    pub fn new() -> Self {
        SpikeBuilder::default().assemble()
    }

    /// Create a builder for more complex configuration.
    pub fn builder() -> SpikeBuilder {
        SpikeBuilder::new()
    }

    /// Whether a spike is in progress.
    pub fn is_applying(&self) -> bool {
        self.applying
    }

    /// Hours until the next spike may start, measured from the last event.
    pub fn next_gap(&self) -> f64 {
        self.next_gap
    }

    fn draw(&mut self, (min, max): (f64, f64)) -> f64 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    fn draw_amplitude(&mut self) -> f64 {
        let magnitude = self.draw(self.amplitude);
        if self.rng.gen_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }

    /// Triangle-wave height `elapsed` hours into the current spike.
    fn current_height(&self, elapsed: f64) -> f64 {
        let half = 0.5 * self.spike_duration;
        if elapsed <= half {
            self.spike_amp * (elapsed / half)
        } else {
            self.spike_amp * ((self.spike_duration - elapsed) / half)
        }
    }
}

impl Default for SpikeInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyInjector for SpikeInjector {
    fn inject(&mut self, delta: f64) -> Injection {
        self.t += delta;
        let elapsed = self.t - self.last_event;

        if self.applying {
            if elapsed >= self.spike_duration {
                self.applying = false;
                self.last_event = self.t;
                return Injection::none();
            }
            return Injection::active(self.current_height(elapsed));
        }

        if elapsed >= self.next_gap {
            self.next_gap = self.draw(self.gap);
            self.spike_duration = self.draw(self.duration);
            self.spike_amp = self.draw_amplitude();
            self.applying = true;
            self.last_event = self.t;
            debug!(
                at = self.t,
                duration = self.spike_duration,
                amplitude = self.spike_amp,
                "spike started"
            );
        }

        Injection::none()
    }

    fn name(&self) -> &str {
        "RandomizedSpike"
    }
}
