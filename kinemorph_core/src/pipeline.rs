// kinemorph_core/src/pipeline.rs

//! End-to-end driver: model in, landmark clip in, rotations out.

use crate::error::Result;
use crate::estimation::{ConditionerConfig, LandmarkConditioner};
use crate::frames::{LandmarkClip, LandmarkFrame};
use crate::geometry::CameraConfig;
use crate::skeleton::{load_glb, resolve, BoneRole, ResolvedSkeleton, SkeletonNode, Side};
use crate::solver::{RotationResult, RotationSolver};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Settings for a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub conditioner: ConditionerConfig,
}

/// A resolved skeleton paired with a conditioner and a solver.
///
/// The skeleton is resolved once at construction; every clip and live frame
/// afterwards reuses it.
#[derive(Debug, Clone)]
pub struct Pipeline {
    skeleton: ResolvedSkeleton,
    conditioner: LandmarkConditioner,
    solver: RotationSolver,
}

impl Pipeline {
    /// Builds a pipeline for an already decoded node hierarchy.
    pub fn from_nodes(
        nodes: &[SkeletonNode],
        config: PipelineConfig,
        camera: CameraConfig,
    ) -> Result<Self> {
        let conditioner = LandmarkConditioner::new(config.conditioner)?;
        let skeleton = resolve(nodes)?;
        Ok(Self {
            skeleton,
            conditioner,
            solver: RotationSolver::new(camera),
        })
    }

    /// Loads a `.glb` model and builds a pipeline for it with the default camera.
    pub fn from_model_path(path: impl AsRef<Path>, config: PipelineConfig) -> Result<Self> {
        let nodes = load_glb(path)?;
        Self::from_nodes(&nodes, config, CameraConfig::default())
    }

    pub fn skeleton(&self) -> &ResolvedSkeleton {
        &self.skeleton
    }

    pub fn config(&self) -> &ConditionerConfig {
        self.conditioner.config()
    }

    /// Conditions `clip` and solves every frame that survives trimming.
    ///
    /// # Returns
    /// One [`RotationResult`] per conditioned frame, in frame order. A clip in
    /// which the hand is never raised yields an empty list.
    pub fn process_clip(&self, clip: &LandmarkClip) -> Result<Vec<RotationResult>> {
        let conditioned = self.conditioner.condition(clip)?;

        let results: Vec<RotationResult> = (0..conditioned.len())
            .map(|i| {
                self.solve_frame(
                    &conditioned.body[i],
                    &conditioned.left_hand[i],
                    &conditioned.right_hand[i],
                )
            })
            .collect();

        let solved_hands = results
            .iter()
            .filter(|r| Side::BOTH.iter().any(|s| r.is_solved(BoneRole::Hand(*s))))
            .count();
        info!(
            input_frames = clip.len(),
            output_frames = results.len(),
            frames_with_hands = solved_hands,
            "solved clip"
        );
        Ok(results)
    }

    /// Solves one unconditioned frame, e.g. from a live feed.
    pub fn solve_frame(
        &self,
        body: &LandmarkFrame,
        left_hand: &LandmarkFrame,
        right_hand: &LandmarkFrame,
    ) -> RotationResult {
        self.solver
            .solve_frame(&self.skeleton, body, left_hand, right_hand)
    }
}
