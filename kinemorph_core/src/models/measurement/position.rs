// kinemorph_core/src/models/measurement/position.rs

use crate::models::measurement::LinearMeasurement;
use crate::types::{ObservationCovariance, ObservationMatrix};

/// A landmark detection observes the tracked position directly.
#[derive(Debug, Clone)]
pub struct PositionMeasurement {
    noise_covariance: ObservationCovariance,
}

impl PositionMeasurement {
    /// Measurement noise `r` on each axis.
    pub fn new(r: f64) -> Self {
        Self {
            noise_covariance: ObservationCovariance::identity() * r,
        }
    }
}

impl LinearMeasurement for PositionMeasurement {
    fn get_r(&self) -> &ObservationCovariance {
        &self.noise_covariance
    }

    fn calculate_jacobian(&self) -> ObservationMatrix {
        // d(z)/d(P) = I, velocity is unobserved
        ObservationMatrix::identity()
    }
}
