// kinemorph_core/src/solver/torso.rs

use super::{solve_joint, RotationResult};
use crate::frames::layout::{
    POSE_LEFT_EAR, POSE_LEFT_EYE, POSE_LEFT_HIP, POSE_LEFT_SHOULDER, POSE_RIGHT_EAR,
    POSE_RIGHT_EYE, POSE_RIGHT_HIP, POSE_RIGHT_SHOULDER,
};
use crate::frames::LandmarkFrame;
use crate::geometry::{
    align_rotation, apply_matrix, normalize, quaternion_from_rotation, rotation_from_quaternion,
    slerp,
};
use crate::skeleton::{BoneRole, ResolvedSkeleton, Side};
use crate::types::{Mat4, Quat, Vec3};
use tracing::debug;

/// Joint positions along the torso that the pose estimator does not observe
/// directly, derived from the shoulders, hips and ears.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TorsoAnchors {
    pub left_hip: Vec3,
    pub right_hip: Vec3,
    pub hips: Vec3,
    pub spine: Vec3,
    pub neck: Vec3,
    pub head: Vec3,
    left_shoulder_inside: Vec3,
    right_shoulder_inside: Vec3,
}

impl TorsoAnchors {
    /// The spine runs from the hip midpoint to the shoulder midpoint. The hips
    /// sit 1/9 of the way up it and the spine joint 3/9; the neck sits 1/9 of
    /// its length above the shoulder midpoint. The head is halfway from the
    /// neck to the ear midpoint.
    pub fn new(body: &LandmarkFrame) -> Self {
        let left_shoulder = body.point(POSE_LEFT_SHOULDER);
        let right_shoulder = body.point(POSE_RIGHT_SHOULDER);
        let left_hip = body.point(POSE_LEFT_HIP);
        let right_hip = body.point(POSE_RIGHT_HIP);

        let center_shoulders = (left_shoulder + right_shoulder) / 2.0;
        let center_hips = (left_hip + right_hip) / 2.0;
        let center_ears = (body.point(POSE_LEFT_EAR) + body.point(POSE_RIGHT_EAR)) / 2.0;

        let spine_vector = center_shoulders - center_hips;
        let ninth = normalize(&spine_vector) * spine_vector.norm() / 9.0;
        let neck = center_shoulders + ninth;

        let across = right_shoulder - left_shoulder;

        Self {
            left_hip,
            right_hip,
            hips: center_hips + ninth,
            spine: center_hips + ninth * 3.0,
            neck,
            head: neck + (center_ears - neck) * 0.5,
            left_shoulder_inside: left_shoulder + across / 3.0,
            right_shoulder_inside: left_shoulder + across * 2.0 / 3.0,
        }
    }

    /// Where the clavicle of `side` starts, a third of the way in from that shoulder.
    pub fn shoulder_inside(&self, side: Side) -> Vec3 {
        match side {
            Side::Left => self.left_shoulder_inside,
            Side::Right => self.right_shoulder_inside,
        }
    }
}

/// Orients the hips between the spine and the two legs, weighting the spine
/// by two thirds. Returns the hip rotation matrix that seeds every chain.
pub(crate) fn solve_hips(
    skeleton: &ResolvedSkeleton,
    anchors: &TorsoAnchors,
    result: &mut RotationResult,
) -> Option<Mat4> {
    let towards = |role: BoneRole, target: &Vec3| -> Option<Quat> {
        let bind = skeleton.translation(role)?;
        let observed = normalize(&(target - anchors.hips));
        Some(quaternion_from_rotation(&align_rotation(&bind, &observed)))
    };

    let to_left = towards(BoneRole::UpLeg(Side::Left), &anchors.left_hip)?;
    let to_right = towards(BoneRole::UpLeg(Side::Right), &anchors.right_hip)?;
    let to_spine = towards(BoneRole::Spine, &anchors.spine)?;

    let q_hips = slerp(&to_spine, &slerp(&to_left, &to_right, 0.5), 1.0 / 3.0);
    result.set(BoneRole::Hips, q_hips);
    Some(rotation_from_quaternion(&q_hips))
}

pub(crate) fn solve_neck(
    skeleton: &ResolvedSkeleton,
    anchors: &TorsoAnchors,
    r_hips: &Mat4,
    result: &mut RotationResult,
) -> Option<Mat4> {
    let bind = skeleton.translation(BoneRole::Head)?;
    let neck = solve_joint(r_hips, &bind, &anchors.neck, &anchors.head);
    result.set(BoneRole::Neck, neck.local);
    Some(neck.accumulated)
}

/// Head orientation from the two eyes, each aligned in the neck's frame and
/// blended halfway.
///
/// `None` when the model has no eye bones, an eye was not detected, or an eye
/// coincides with the head anchor.
pub(crate) fn solve_head(
    skeleton: &ResolvedSkeleton,
    body: &LandmarkFrame,
    anchors: &TorsoAnchors,
    r_neck: &Mat4,
) -> Option<Quat> {
    let to_neck_frame = r_neck.transpose();
    let mut eye_rotations = Vec::with_capacity(2);

    for (side, landmark) in [(Side::Left, POSE_LEFT_EYE), (Side::Right, POSE_RIGHT_EYE)] {
        let bind = skeleton.translation(BoneRole::Eye(side))?;
        if !body.is_present(landmark) {
            debug!(side = side.name(), "eye not detected");
            return None;
        }
        let direction = normalize(&(body.point(landmark) - anchors.head));
        if direction == Vec3::zeros() {
            return None;
        }
        let local = apply_matrix(&to_neck_frame, &direction);
        eye_rotations.push(quaternion_from_rotation(&align_rotation(&bind, &local)));
    }

    Some(slerp(&eye_rotations[0], &eye_rotations[1], 0.5))
}
