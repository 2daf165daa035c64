// kinemorph_core/src/models/mod.rs

//! Linear models for tracking a single landmark through time.

pub mod dynamics;
pub mod measurement;

pub use dynamics::generic::ConstantVelocityModel;
pub use dynamics::LinearDynamics;
pub use measurement::position::PositionMeasurement;
pub use measurement::LinearMeasurement;
