// kinemorph_core/src/estimation/mod.rs

//! Temporal conditioning of landmark streams: per-point Kalman tracking,
//! moving-average smoothing and the clip-level conditioner that drives both.

use crate::types::{State, StateCovariance, Vec3};

pub mod conditioner;
pub mod filters;
pub mod kalman;

pub use conditioner::{ConditionerConfig, LandmarkConditioner};
pub use filters::kalman::LandmarkKalmanFilter;
pub use filters::moving_average::{moving_average, MovingAverageFilter};

/// The estimate of one tracked landmark (x, P, t).
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    /// `[x, y, z, vx, vy, vz]`
    pub vector: State,
    pub covariance: StateCovariance,
    pub last_update_timestamp: f64,
}

impl TrackState {
    pub fn position(&self) -> Vec3 {
        self.vector.fixed_rows::<3>(0).into_owned()
    }

    pub fn velocity(&self) -> Vec3 {
        self.vector.fixed_rows::<3>(3).into_owned()
    }
}
