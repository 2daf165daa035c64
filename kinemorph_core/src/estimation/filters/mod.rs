// kinemorph_core/src/estimation/filters/mod.rs

pub mod kalman;
pub mod moving_average;
