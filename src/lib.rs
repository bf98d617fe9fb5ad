//! Indoor WiFi RSSI propagation simulator.
//!
//! Predicts received signal strength (dBm) at arbitrary points inside a
//! building by combining:
//! - Free-space path loss
//! - Frequency-dependent material attenuation (plane-wave model)
//! - Coherent multipath synthesis with random reflected paths
//! - 2D ray marching through a material grid to discover which walls lie
//!   between an access point and a sample point
//!
//! Units:
//! - Power: dBm, mW (conversions provided in [`propagation`])
//! - Distance: meters
//! - Frequency: Hz

use serde::Deserialize;

pub mod error;
pub mod grid;
pub mod materials;
pub mod propagation;
pub mod raytrace;
pub mod scenario;

pub use error::Error;
pub use grid::MaterialGrid;
pub use materials::{Material, MaterialLayer, SignalPath};
pub use propagation::{PropagationConfig, PropagationModel};
pub use raytrace::trace;
pub use scenario::Scenario;

/// Simple 2D point in building coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point in meters.
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_between_points() {
        let origin = Point::new(0.0, 0.0);
        assert_eq!(0.0, origin.distance_to(origin));
        assert_eq!(5.0, origin.distance_to(Point::new(3.0, 4.0)));
        assert_eq!(
            origin.distance_to(Point::new(3.0, 4.0)),
            Point::new(3.0, 4.0).distance_to(origin)
        );
    }
}
