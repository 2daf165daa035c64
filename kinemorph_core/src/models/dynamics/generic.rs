// kinemorph_core/src/models/dynamics/generic.rs

use crate::models::dynamics::LinearDynamics;
use crate::types::StateCovariance;

// --- Constant Velocity Model ---
// Assumes the point keeps drifting with the velocity it had; any change in
// velocity is absorbed by the process noise Q.
#[derive(Debug, Clone)]
pub struct ConstantVelocityModel {
    process_noise_q: StateCovariance,
}

impl ConstantVelocityModel {
    /// A model whose process noise is `q` on every state component.
    pub fn new(q: f64) -> Self {
        Self {
            process_noise_q: StateCovariance::identity() * q,
        }
    }
}

impl LinearDynamics for ConstantVelocityModel {
    fn calculate_jacobian(&self, dt: f64) -> StateCovariance {
        let mut f = StateCovariance::identity();
        // d(P)/d(V) = dt
        f[(0, 3)] = dt;
        f[(1, 4)] = dt;
        f[(2, 5)] = dt;
        f
    }

    fn get_q(&self) -> &StateCovariance {
        &self.process_noise_q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::State;
    use approx::assert_abs_diff_eq;

    #[test]
    fn propagate_moves_position_by_velocity() {
        let model = ConstantVelocityModel::new(0.001);
        let x = State::new(1.0, 2.0, 3.0, 0.5, -1.0, 2.0);
        let next = model.propagate(&x, 0.1);
        assert_abs_diff_eq!(next, State::new(1.05, 1.9, 3.2, 0.5, -1.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn process_noise_is_isotropic() {
        let model = ConstantVelocityModel::new(0.25);
        assert_eq!(*model.get_q(), StateCovariance::identity() * 0.25);
    }
}
