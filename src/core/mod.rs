//! Core data structures shared by detectors and the simulation.

mod point;
mod result;

pub use point::Point;
pub use result::DetectionResult;
