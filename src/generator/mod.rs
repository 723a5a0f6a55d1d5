//! Synthetic stream generators.
//!
//! A generator produces one value per call, advancing its internal clock by
//! the requested time step (in hours).

mod sinusoidal;

pub use sinusoidal::{SinusoidalBuilder, SinusoidalGenerator, WaveComponent};

/// Common interface for stream generators.
pub trait StreamGenerator {
    /// Advance the clock by `delta` hours and return the next value.
    fn next_value(&mut self, delta: f64) -> f64;

    /// Hours elapsed since the generator was created.
    fn elapsed(&self) -> f64;

    /// Get the generator name.
    fn name(&self) -> &str;
}

/// Type alias for boxed generator trait objects.
pub type BoxedGenerator = Box<dyn StreamGenerator + Send>;
