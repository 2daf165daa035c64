// kinemorph_core/src/models/measurement/mod.rs

use crate::types::{ObservationCovariance, ObservationMatrix, State, Vec3};
use std::fmt::Debug;

pub mod position;

// --- MEASUREMENT MODEL TRAIT ---
// A linear observation of the tracked state. `z = H x + v`
pub trait LinearMeasurement: Debug + Send + Sync {
    /// Returns the measurement noise covariance matrix `R`.
    fn get_r(&self) -> &ObservationCovariance;

    /// The observation matrix `H`.
    fn calculate_jacobian(&self) -> ObservationMatrix;

    /// Predicts the ideal measurement `z_pred = H x`.
    fn predict_measurement(&self, x: &State) -> Vec3 {
        self.calculate_jacobian() * x
    }
}
