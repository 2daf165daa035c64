// kinemorph_core/src/solver/mod.rs

//! Reconstructs local bone rotations from one frame of landmarks by walking
//! the skeleton's kinematic chains from the hips outwards.

use crate::frames::LandmarkFrame;
use crate::geometry::CameraConfig;
use crate::skeleton::{BoneRole, Finger, ResolvedSkeleton, Side};
use crate::types::{is_sentinel, sentinel_quaternion, to_wxyz, Quat};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub mod joint;
mod limbs;
mod torso;

pub use joint::{solve_joint, JointSolution};

/// Number of rotations published per frame.
pub const OUTPUT_SLOT_COUNT: usize = 41;

/// The published slot order of a frame's rotations.
#[rustfmt::skip]
pub const OUTPUT_ROLES: [BoneRole; OUTPUT_SLOT_COUNT] = {
    use BoneRole::{Hand, Head, Hips, LowArm, Neck, Phalanx as P, Shoulder, UpArm};
    use Finger::{Index, Middle, Pinky, Ring, Thumb};
    use Side::{Left, Right};
    [
        Head, Neck, Hips,
        Shoulder(Left), UpArm(Left), LowArm(Left), Hand(Left),
        P(Left, Thumb, 1), P(Left, Thumb, 2), P(Left, Thumb, 3),
        P(Left, Index, 1), P(Left, Index, 2), P(Left, Index, 3),
        P(Left, Middle, 1), P(Left, Middle, 2), P(Left, Middle, 3),
        P(Left, Ring, 1), P(Left, Ring, 2), P(Left, Ring, 3),
        P(Left, Pinky, 1), P(Left, Pinky, 2), P(Left, Pinky, 3),
        Shoulder(Right), UpArm(Right), LowArm(Right), Hand(Right),
        P(Right, Thumb, 1), P(Right, Thumb, 2), P(Right, Thumb, 3),
        P(Right, Index, 1), P(Right, Index, 2), P(Right, Index, 3),
        P(Right, Middle, 1), P(Right, Middle, 2), P(Right, Middle, 3),
        P(Right, Ring, 1), P(Right, Ring, 2), P(Right, Ring, 3),
        P(Right, Pinky, 1), P(Right, Pinky, 2), P(Right, Pinky, 3),
    ]
};

/// Local rotations solved for one frame. Roles without a solution read back
/// as the sentinel quaternion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RotationResult {
    rotations: BTreeMap<BoneRole, Quat>,
}

impl RotationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, role: BoneRole, rotation: Quat) {
        self.rotations.insert(role, rotation);
    }

    /// The rotation of `role`, or the sentinel if it was not solved.
    pub fn get(&self, role: BoneRole) -> Quat {
        self.rotations
            .get(&role)
            .copied()
            .unwrap_or_else(sentinel_quaternion)
    }

    pub fn is_solved(&self, role: BoneRole) -> bool {
        self.rotations.get(&role).is_some_and(|q| !is_sentinel(q))
    }

    /// `[w, x, y, z]` per slot of [`OUTPUT_ROLES`].
    pub fn to_array(&self) -> Vec<[f64; 4]> {
        OUTPUT_ROLES.iter().map(|role| to_wxyz(&self.get(*role))).collect()
    }

    /// The solved output slots with their roles, sentinels left out.
    pub fn named(&self) -> Vec<(BoneRole, [f64; 4])> {
        OUTPUT_ROLES
            .iter()
            .filter(|role| self.is_solved(**role))
            .map(|role| (*role, to_wxyz(&self.get(*role))))
            .collect()
    }
}

/// Turns landmark frames into bone rotations for one resolved skeleton.
#[derive(Debug, Clone, Default)]
pub struct RotationSolver {
    camera: CameraConfig,
}

impl RotationSolver {
    pub fn new(camera: CameraConfig) -> Self {
        Self { camera }
    }

    pub fn camera(&self) -> &CameraConfig {
        &self.camera
    }

    /// Solves every chain of one frame.
    ///
    /// Landmarks are first re-projected into the avatar's world. The hips are
    /// solved from the torso anchors, then the neck and head, then each arm
    /// seeded with the hip rotation and each hand and its fingers seeded with
    /// the low-arm rotation. A body frame without detections yields only
    /// sentinels; a hand frame without detections leaves that hand's slots at
    /// the sentinel.
    pub fn solve_frame(
        &self,
        skeleton: &ResolvedSkeleton,
        body: &LandmarkFrame,
        left_hand: &LandmarkFrame,
        right_hand: &LandmarkFrame,
    ) -> RotationResult {
        let mut result = RotationResult::new();
        if !body.any_present() {
            debug!("empty body frame");
            return result;
        }

        let body = self.reproject(body);
        let anchors = torso::TorsoAnchors::new(&body);

        let Some(r_hips) = torso::solve_hips(skeleton, &anchors, &mut result) else {
            warn!("skeleton lacks the hip bind geometry, frame left unsolved");
            return result;
        };

        match torso::solve_neck(skeleton, &anchors, &r_hips, &mut result) {
            Some(r_neck) => match torso::solve_head(skeleton, &body, &anchors, &r_neck) {
                Some(q_head) => result.set(BoneRole::Head, q_head),
                None => debug!("head left at sentinel"),
            },
            None => debug!("neck left at sentinel"),
        }

        for (side, hand) in [(Side::Left, left_hand), (Side::Right, right_hand)] {
            let inside = anchors.shoulder_inside(side);
            let Some(r_low_arm) = limbs::solve_arm(skeleton, &body, side, &inside, &r_hips, &mut result)
            else {
                continue;
            };
            if !hand.any_present() {
                debug!(side = side.name(), "no hand detections");
                continue;
            }
            let hand = self.reproject(hand);
            limbs::solve_hand(skeleton, &hand, side, &r_low_arm, &mut result);
        }

        result
    }

    fn reproject(&self, frame: &LandmarkFrame) -> LandmarkFrame {
        LandmarkFrame::new(self.camera.reproject_frame(&frame.points))
    }
}
