//! Simulation of a periodic stream with injected anomalies and live detection.

mod manager;

pub use manager::{SimulationConfig, SimulationManager};
