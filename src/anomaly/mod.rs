//! Anomaly injection into a generated stream.
//!
//! An injector runs on the same clock as the generator and returns an
//! additive offset for each sample, plus whether an anomaly is active.

mod spike;

pub use spike::{SpikeBuilder, SpikeInjector};

/// Offset produced by an injector for a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Injection {
    /// Value added to the clean sample.
    pub offset: f64,
    /// Ground-truth label: an anomaly is in progress.
    pub active: bool,
}

impl Injection {
    /// No anomaly for this sample.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn active(offset: f64) -> Self {
        Self {
            offset,
            active: true,
        }
    }
}

/// Common interface for anomaly injectors.
pub trait AnomalyInjector {
    /// Advance the injector clock by `delta` hours and return the offset for this sample.
    fn inject(&mut self, delta: f64) -> Injection;

    /// Get the injector name.
    fn name(&self) -> &str;
}

/// Type alias for boxed injector trait objects.
pub type BoxedInjector = Box<dyn AnomalyInjector + Send>;

/// Injector that never adds anomalies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInjection;

impl AnomalyInjector for NoInjection {
    fn inject(&mut self, _delta: f64) -> Injection {
        Injection::none()
    }

    fn name(&self) -> &str {
        "None"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_injection_is_always_clean() {
        let mut injector = NoInjection;
        for _ in 0..10 {
            assert_eq!(injector.inject(1.0), Injection::none());
        }
        assert_eq!(injector.name(), "None");
    }

    #[test]
    fn boxed_injector() {
        let mut injector: BoxedInjector = Box::new(NoInjection);
        assert!(!injector.inject(0.5).active);
    }
}
