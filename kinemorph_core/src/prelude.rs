// kinemorph_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::models::dynamics::LinearDynamics;
pub use crate::models::measurement::LinearMeasurement;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::frames::{LandmarkClip, LandmarkFrame};
pub use crate::skeleton::{BoneRole, Finger, ResolvedSkeleton, Side, SkeletonNode};
pub use crate::solver::{RotationResult, OUTPUT_ROLES};
pub use crate::types::{Mat4, Quat, Vec3};

// --- Pipeline Stages ---
pub use crate::estimation::{ConditionerConfig, LandmarkConditioner};
pub use crate::geometry::CameraConfig;
pub use crate::pipeline::{Pipeline, PipelineConfig};
pub use crate::solver::RotationSolver;

// --- Errors ---
pub use crate::error::{ClipError, PipelineError, StructureError};
