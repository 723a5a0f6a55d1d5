//! Seasonal sinusoidal pattern with Gaussian noise.

use super::StreamGenerator;
use crate::error::{Result, StreamError};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;
use std::f64::consts::PI;

/// One periodic component of the signal.
///
/// The component value at time `t` is
/// `amp * sin_ratio * sin(2πft) + amp * cos_ratio * cos(3 * 2πft)`,
/// i.e. a fundamental plus a third harmonic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveComponent {
    /// Frequency in cycles per hour.
    pub freq: f64,
    pub amp: f64,
    pub sin_ratio: f64,
    pub cos_ratio: f64,
}

impl WaveComponent {
    /// Slow seasonal wave, one cycle roughly every six months.
    pub fn seasonal() -> Self {
        Self {
            freq: 1.0 / (6.0 * 30.0 * 24.0),
            amp: 1.0,
            sin_ratio: 1.0,
            cos_ratio: 0.5,
        }
    }

    /// Faster wave with a twenty day cycle.
    pub fn weekly() -> Self {
        Self {
            freq: 1.0 / (20.0 * 24.0),
            amp: 0.5,
            sin_ratio: 1.0,
            cos_ratio: 0.3,
        }
    }

    /// Value of the component at time `t` (hours).
    pub fn at(&self, t: f64) -> f64 {
        let phase = 2.0 * PI * t * self.freq;
        self.amp * self.sin_ratio * phase.sin() + self.amp * self.cos_ratio * (3.0 * phase).cos()
    }

    fn validate(&self, label: &str) -> Result<()> {
        let fields = [self.freq, self.amp, self.sin_ratio, self.cos_ratio];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(StreamError::invalid(format!(
                "{label} component parameters must be finite"
            )));
        }
        if self.freq < 0.0 {
            return Err(StreamError::invalid(format!(
                "{label} frequency must be non-negative"
            )));
        }
        Ok(())
    }
}

/// Generates a seasonal plus weekly sinusoidal signal with Gaussian noise.
///
/// # Example
/// ```
/// use anofox_stream::generator::{SinusoidalGenerator, StreamGenerator};
///
/// let mut generator = SinusoidalGenerator::builder()
///     .noise_std(0.0)
///     .seed(7)
///     .build()
///     .unwrap();
///
/// let value = generator.next_value(1.0);
/// assert!((value - generator.expected_at(1.0)).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SinusoidalGenerator {
    seasonal: WaveComponent,
    weekly: WaveComponent,
    noise_std: f64,
    offset: f64,
    /// Standard normal source, scaled by `noise_std`.
    noise: Option<Normal>,
    rng: StdRng,
    t: f64,
}

/// Builder for SinusoidalGenerator.
#[derive(Debug, Clone)]
pub struct SinusoidalBuilder {
    seasonal: WaveComponent,
    weekly: WaveComponent,
    noise_std: f64,
    offset: f64,
    seed: Option<u64>,
}

impl Default for SinusoidalBuilder {
    fn default() -> Self {
        Self {
            seasonal: WaveComponent::seasonal(),
            weekly: WaveComponent::weekly(),
            noise_std: 0.04,
            offset: 2.0,
            seed: None,
        }
    }
}

impl SinusoidalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seasonal(mut self, component: WaveComponent) -> Self {
        self.seasonal = component;
        self
    }

    pub fn weekly(mut self, component: WaveComponent) -> Self {
        self.weekly = component;
        self
    }

    /// Standard deviation of the additive noise. Zero disables noise.
    pub fn noise_std(mut self, noise_std: f64) -> Self {
        self.noise_std = noise_std;
        self
    }

    /// Constant added to every value.
    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Seed the noise source for reproducible streams.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<SinusoidalGenerator> {
        self.seasonal.validate("seasonal")?;
        self.weekly.validate("weekly")?;

        if !self.offset.is_finite() {
            return Err(StreamError::invalid("offset must be finite"));
        }
        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(StreamError::invalid("noise_std must be non-negative"));
        }

        Ok(self.assemble())
    }

    fn assemble(self) -> SinusoidalGenerator {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        SinusoidalGenerator {
            seasonal: self.seasonal,
            weekly: self.weekly,
            noise_std: self.noise_std,
            offset: self.offset,
            noise: Normal::new(0.0, 1.0).ok(),
            rng,
            t: 0.0,
        }
    }
}

impl SinusoidalGenerator {
    /// Create a generator with default parameters and an entropy-seeded noise source.
    pub fn new() -> Self {
        SinusoidalBuilder::default().assemble()
    }

    /// Create a builder for more complex configuration.
    pub fn builder() -> SinusoidalBuilder {
        SinusoidalBuilder::new()
    }

    pub fn seasonal(&self) -> &WaveComponent {
        &self.seasonal
    }

    pub fn weekly(&self) -> &WaveComponent {
        &self.weekly
    }

    pub fn noise_std(&self) -> f64 {
        self.noise_std
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Noise-free value of the signal at absolute time `t` (hours).
    pub fn expected_at(&self, t: f64) -> f64 {
        self.seasonal.at(t) + self.weekly.at(t) + self.offset
    }

    fn sample_noise(&mut self) -> f64 {
        match &self.noise {
            Some(dist) if self.noise_std > 0.0 => self.noise_std * dist.sample(&mut self.rng),
            _ => 0.0,
        }
    }
}

impl Default for SinusoidalGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamGenerator for SinusoidalGenerator {
    fn next_value(&mut self, delta: f64) -> f64 {
        self.t += delta;
        self.expected_at(self.t) + self.sample_noise()
    }

    fn elapsed(&self) -> f64 {
        self.t
    }

    fn name(&self) -> &str {
        "Sinusoidal"
    }
}
