// kinemorph_core/src/estimation/kalman.rs

use crate::estimation::TrackState;
use crate::models::{LinearDynamics, LinearMeasurement};
use crate::types::{StateCovariance, Vec3};

/// A container for parameters needed by the prediction step.
pub struct KalmanPredictParams<'a> {
    pub dynamics: &'a dyn LinearDynamics,
}

/// A container for parameters needed by the update step.
pub struct KalmanMeasurementParams<'a> {
    pub model: &'a dyn LinearMeasurement,
    pub z: &'a Vec3,
}

/// PURE FUNCTION: Performs one prediction step.
/// Takes a state and returns the new, predicted state. It has no side effects.
pub fn kalman_predict(
    current_state: &TrackState,
    params: &KalmanPredictParams,
    dt: f64,
) -> TrackState {
    let f = params.dynamics.calculate_jacobian(dt);
    let new_x = params.dynamics.propagate(&current_state.vector, dt);
    let new_p = f * current_state.covariance * f.transpose() + params.dynamics.get_q();

    TrackState {
        vector: new_x,
        covariance: new_p,
        last_update_timestamp: current_state.last_update_timestamp + dt,
    }
}

/// PURE FUNCTION: Performs one measurement update step.
///
/// The covariance uses the Joseph form `(I - KH) P (I - KH)ᵀ + K R Kᵀ`, which
/// keeps `P` symmetric positive semi-definite under rounding. If the innovation
/// covariance is singular the predicted state is returned unchanged.
pub fn kalman_update(predicted_state: &TrackState, params: &KalmanMeasurementParams) -> TrackState {
    let h = params.model.calculate_jacobian();
    let r = params.model.get_r();
    let z_pred = params.model.predict_measurement(&predicted_state.vector);

    let p_priori = &predicted_state.covariance;
    let y = params.z - z_pred; // Innovation
    let s = h * p_priori * h.transpose() + r;

    let Some(s_inv) = s.try_inverse() else {
        return predicted_state.clone();
    };

    let k_gain = p_priori * h.transpose() * s_inv;
    let new_x = predicted_state.vector + k_gain * y;
    let i_kh = StateCovariance::identity() - k_gain * h;
    let new_p = i_kh * p_priori * i_kh.transpose() + k_gain * r * k_gain.transpose();

    TrackState {
        vector: new_x,
        covariance: new_p,
        last_update_timestamp: predicted_state.last_update_timestamp,
    }
}
