//! Configuration file handling.
//!
//! A simulation is described by an `anofox-stream.toml` file with the
//! sections `[simulation]`, `[generator]`, `[anomaly]` and `[detector]`.
//! Every field is optional and falls back to its default.

use crate::anomaly::{BoxedInjector, NoInjection, SpikeInjector};
use crate::detection::DetectorConfig;
use crate::error::{Result, StreamError};
use crate::generator::{BoxedGenerator, SinusoidalGenerator, WaveComponent};
use crate::simulation::{SimulationConfig, SimulationManager};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "anofox-stream.toml";

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Seed for all random sources. Unset means a fresh stream every run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub anomaly: AnomalyConfig,

    #[serde(default)]
    pub detector: DetectorConfig,
}

/// Parameters of the sinusoidal stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_seasonal_freq")]
    pub seasonal_freq: f64,
    #[serde(default = "default_seasonal_amp")]
    pub seasonal_amp: f64,
    #[serde(default = "default_seasonal_sin_ratio")]
    pub seasonal_sin_ratio: f64,
    #[serde(default = "default_seasonal_cos_ratio")]
    pub seasonal_cos_ratio: f64,
    #[serde(default = "default_weekly_freq")]
    pub weekly_freq: f64,
    #[serde(default = "default_weekly_amp")]
    pub weekly_amp: f64,
    #[serde(default = "default_weekly_sin_ratio")]
    pub weekly_sin_ratio: f64,
    #[serde(default = "default_weekly_cos_ratio")]
    pub weekly_cos_ratio: f64,
    #[serde(default = "default_noise_std")]
    pub noise_std: f64,
    #[serde(default = "default_offset")]
    pub offset: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seasonal_freq: default_seasonal_freq(),
            seasonal_amp: default_seasonal_amp(),
            seasonal_sin_ratio: default_seasonal_sin_ratio(),
            seasonal_cos_ratio: default_seasonal_cos_ratio(),
            weekly_freq: default_weekly_freq(),
            weekly_amp: default_weekly_amp(),
            weekly_sin_ratio: default_weekly_sin_ratio(),
            weekly_cos_ratio: default_weekly_cos_ratio(),
            noise_std: default_noise_std(),
            offset: default_offset(),
        }
    }
}

fn default_seasonal_freq() -> f64 {
    WaveComponent::seasonal().freq
}

fn default_seasonal_amp() -> f64 {
    WaveComponent::seasonal().amp
}

fn default_seasonal_sin_ratio() -> f64 {
    WaveComponent::seasonal().sin_ratio
}

fn default_seasonal_cos_ratio() -> f64 {
    WaveComponent::seasonal().cos_ratio
}

fn default_weekly_freq() -> f64 {
    WaveComponent::weekly().freq
}

fn default_weekly_amp() -> f64 {
    WaveComponent::weekly().amp
}

fn default_weekly_sin_ratio() -> f64 {
    WaveComponent::weekly().sin_ratio
}

fn default_weekly_cos_ratio() -> f64 {
    WaveComponent::weekly().cos_ratio
}

fn default_noise_std() -> f64 {
    0.04
}

fn default_offset() -> f64 {
    2.0
}

impl GeneratorConfig {
    pub fn build(&self, seed: Option<u64>) -> Result<SinusoidalGenerator> {
        let mut builder = SinusoidalGenerator::builder()
            .seasonal(WaveComponent {
                freq: self.seasonal_freq,
                amp: self.seasonal_amp,
                sin_ratio: self.seasonal_sin_ratio,
                cos_ratio: self.seasonal_cos_ratio,
            })
            .weekly(WaveComponent {
                freq: self.weekly_freq,
                amp: self.weekly_amp,
                sin_ratio: self.weekly_sin_ratio,
                cos_ratio: self.weekly_cos_ratio,
            })
            .noise_std(self.noise_std)
            .offset(self.offset);
        if let Some(seed) = seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }
}

/// Parameters of the spike injector. Times are in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Disable to run on a clean stream.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_gap_min")]
    pub gap_min: f64,
    #[serde(default = "default_gap_max")]
    pub gap_max: f64,
    #[serde(default = "default_duration_min")]
    pub duration_min: f64,
    #[serde(default = "default_duration_max")]
    pub duration_max: f64,
    #[serde(default = "default_amplitude_min")]
    pub amplitude_min: f64,
    #[serde(default = "default_amplitude_max")]
    pub amplitude_max: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            gap_min: default_gap_min(),
            gap_max: default_gap_max(),
            duration_min: default_duration_min(),
            duration_max: default_duration_max(),
            amplitude_min: default_amplitude_min(),
            amplitude_max: default_amplitude_max(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_gap_min() -> f64 {
    5.0 * 24.0
}

fn default_gap_max() -> f64 {
    80.0 * 24.0
}

fn default_duration_min() -> f64 {
    6.0
}

fn default_duration_max() -> f64 {
    2.0 * 24.0
}

fn default_amplitude_min() -> f64 {
    0.8
}

fn default_amplitude_max() -> f64 {
    2.6
}

impl AnomalyConfig {
    pub fn build(&self, seed: Option<u64>) -> Result<BoxedInjector> {
        if !self.enabled {
            return Ok(Box::new(NoInjection));
        }
        let mut builder = SpikeInjector::builder()
            .gap(self.gap_min, self.gap_max)
            .duration(self.duration_min, self.duration_max)
            .amplitude(self.amplitude_min, self.amplitude_max);
        if let Some(seed) = seed {
            builder = builder.seed(seed);
        }
        Ok(Box::new(builder.build()?))
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StreamError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, else the default file if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the default configuration as TOML.
    pub fn default_toml() -> Result<String> {
        let body = toml::to_string_pretty(&Self::default())?;
        Ok(format!(
            "# anofox-stream configuration\n\
             # Times are in hours. Set `seed = <n>` at the top for reproducible runs.\n\n{body}"
        ))
    }

    /// Check every section by building its component.
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.generator.build(None)?;
        self.anomaly.build(None)?;
        self.detector.build()?;
        Ok(())
    }

    /// Build the full simulation described by this configuration.
    ///
    /// With a seed, the generator uses `seed` and the injector `seed + 1`.
    pub fn build_simulation(&self) -> Result<SimulationManager> {
        let generator: BoxedGenerator = Box::new(self.generator.build(self.seed)?);
        let injector = self.anomaly.build(self.seed.map(|s| s.wrapping_add(1)))?;
        let detector = self.detector.build()?;
        SimulationManager::new(self.simulation.clone(), generator, injector, detector)
    }
}
