// kinemorph_core/src/frames/layout.rs

//! Landmark index conventions of the external pose estimator.

use crate::skeleton::{BoneRole, Finger, Side};

/// Number of landmarks in a body pose frame.
pub const POSE_LANDMARK_COUNT: usize = 33;
/// Number of landmarks in a hand frame.
pub const HAND_LANDMARK_COUNT: usize = 21;

// --- Body pose ids ---
pub const POSE_LEFT_EYE: usize = 2;
pub const POSE_RIGHT_EYE: usize = 5;
pub const POSE_LEFT_EAR: usize = 7;
pub const POSE_RIGHT_EAR: usize = 8;
pub const POSE_LEFT_SHOULDER: usize = 11;
pub const POSE_RIGHT_SHOULDER: usize = 12;
pub const POSE_LEFT_ELBOW: usize = 13;
pub const POSE_RIGHT_ELBOW: usize = 14;
pub const POSE_LEFT_WRIST: usize = 15;
pub const POSE_RIGHT_WRIST: usize = 16;
pub const POSE_LEFT_HIP: usize = 23;
pub const POSE_RIGHT_HIP: usize = 24;

// --- Hand ids ---
pub const HAND_WRIST: usize = 0;

/// The body landmark whose position marks where `role` starts in the pose frame.
///
/// A bone is anchored at its own joint: the up-arm at the elbow it rotates
/// towards, the low-arm at the wrist.
pub fn pose_landmark(role: BoneRole) -> Option<usize> {
    let pick = |side: Side, left: usize, right: usize| match side {
        Side::Left => left,
        Side::Right => right,
    };
    match role {
        BoneRole::Eye(s) => Some(pick(s, POSE_LEFT_EYE, POSE_RIGHT_EYE)),
        BoneRole::Shoulder(s) => Some(pick(s, POSE_LEFT_SHOULDER, POSE_RIGHT_SHOULDER)),
        BoneRole::UpArm(s) => Some(pick(s, POSE_LEFT_ELBOW, POSE_RIGHT_ELBOW)),
        BoneRole::LowArm(s) => Some(pick(s, POSE_LEFT_WRIST, POSE_RIGHT_WRIST)),
        BoneRole::UpLeg(s) => Some(pick(s, POSE_LEFT_HIP, POSE_RIGHT_HIP)),
        _ => None,
    }
}

/// The hand landmark for `role` in a hand frame.
pub fn hand_landmark(role: BoneRole) -> Option<usize> {
    match role {
        BoneRole::Hand(_) => Some(HAND_WRIST),
        BoneRole::Phalanx(_, finger, segment) if (1..=4).contains(&segment) => {
            Some(finger_base(finger) + usize::from(segment) - 1)
        }
        _ => None,
    }
}

/// Landmark id of a finger's first joint; the next three ids follow outwards.
fn finger_base(finger: Finger) -> usize {
    match finger {
        Finger::Thumb => 1,
        Finger::Index => 5,
        Finger::Middle => 9,
        Finger::Ring => 13,
        Finger::Pinky => 17,
    }
}
