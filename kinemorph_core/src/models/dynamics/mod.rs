// kinemorph_core/src/models/dynamics/mod.rs

use crate::types::{State, StateCovariance};
use std::fmt::Debug;

pub mod generic;

/// A linear, time-invariant motion model `x_k+1 = F(dt) x_k + w`, `w ~ N(0, Q)`.
pub trait LinearDynamics: Debug + Send + Sync {
    /// The state transition matrix `F` for a step of `dt` seconds.
    fn calculate_jacobian(&self, dt: f64) -> StateCovariance;

    /// The process noise covariance `Q` added on every prediction.
    fn get_q(&self) -> &StateCovariance;

    /// Propagates the state forward by `dt` seconds.
    ///
    /// # Arguments
    /// * `x`: Current state vector.
    /// * `dt`: Time step duration. Must be non-negative.
    ///
    /// # Returns
    /// The predicted state vector at `t + dt`.
    fn propagate(&self, x: &State, dt: f64) -> State {
        self.calculate_jacobian(dt) * x
    }
}
