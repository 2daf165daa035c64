// kinemorph_core/src/estimation/filters/kalman.rs

use crate::estimation::kalman::{
    kalman_predict, kalman_update, KalmanMeasurementParams, KalmanPredictParams,
};
use crate::estimation::TrackState;
use crate::models::{
    ConstantVelocityModel, LinearDynamics, LinearMeasurement, PositionMeasurement,
};
use crate::types::{State, StateCovariance, Vec3};

/// Variance assigned to every state component once a track has lost its
/// measurements, so the next detection is trusted almost completely.
pub const LOST_TRACK_VARIANCE: f64 = 1e6;

/// A constant-velocity Kalman filter following one landmark channel.
#[derive(Debug)]
pub struct LandmarkKalmanFilter {
    /// The current state of the filter (x, P, t).
    state: TrackState,
    /// Time between two consecutive frames.
    dt: f64,
    dynamics: Box<dyn LinearDynamics>,
    measurement_model: Box<dyn LinearMeasurement>,
}

impl LandmarkKalmanFilter {
    pub fn new(
        initial_state: TrackState,
        dt: f64,
        dynamics: Box<dyn LinearDynamics>,
        measurement_model: Box<dyn LinearMeasurement>,
    ) -> Self {
        Self {
            state: initial_state,
            dt,
            dynamics,
            measurement_model,
        }
    }

    /// Starts a track from two detections of the same landmark.
    ///
    /// # Arguments
    /// * `first`, `second`: The two earliest detections, in time order.
    /// * `elapsed`: Seconds between the two detections. Must be positive.
    /// * `dt`: Seconds between consecutive frames.
    /// * `process_noise`, `measurement_noise`: Diagonal values of `Q` and `R`.
    ///
    /// # Returns
    /// A filter positioned at `second`, moving with the finite-difference
    /// velocity, certain about position and very uncertain about velocity.
    pub fn from_detections(
        first: &Vec3,
        second: &Vec3,
        elapsed: f64,
        dt: f64,
        process_noise: f64,
        measurement_noise: f64,
    ) -> Self {
        let velocity = (second - first) / elapsed;
        let vector = State::new(
            second.x, second.y, second.z, velocity.x, velocity.y, velocity.z,
        );

        let mut covariance = StateCovariance::identity() * LOST_TRACK_VARIANCE;
        for i in 0..3 {
            covariance[(i, i)] = measurement_noise;
        }

        Self::new(
            TrackState {
                vector,
                covariance,
                last_update_timestamp: 0.0,
            },
            dt,
            Box::new(ConstantVelocityModel::new(process_noise)),
            Box::new(PositionMeasurement::new(measurement_noise)),
        )
    }

    /// Advances the track by one frame and returns the position to store.
    ///
    /// A detection is fused after the prediction. Without one the prediction
    /// is returned as-is and the covariance collapses to
    /// [`LOST_TRACK_VARIANCE`].
    pub fn step(&mut self, measurement: Option<&Vec3>) -> Vec3 {
        self.predict();
        match measurement {
            Some(z) => self.update(z),
            None => self.state.covariance = StateCovariance::identity() * LOST_TRACK_VARIANCE,
        }
        self.state.position()
    }

    pub fn get_state(&self) -> &TrackState {
        &self.state
    }

    // --- Private Helper Methods ---

    fn predict(&mut self) {
        let params = KalmanPredictParams {
            dynamics: self.dynamics.as_ref(),
        };
        self.state = kalman_predict(&self.state, &params, self.dt);
    }

    fn update(&mut self, z: &Vec3) {
        let params = KalmanMeasurementParams {
            model: self.measurement_model.as_ref(),
            z,
        };
        self.state = kalman_update(&self.state, &params);
    }
}
