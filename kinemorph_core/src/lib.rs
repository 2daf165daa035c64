// kinemorph_core/src/lib.rs

// This file defines the public modules of the library.
pub mod error;
pub mod estimation;
pub mod frames;
pub mod geometry;
pub mod models;
pub mod pipeline;
pub mod prelude;
pub mod skeleton;
pub mod solver;
pub mod types;
