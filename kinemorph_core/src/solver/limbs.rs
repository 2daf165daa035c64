// kinemorph_core/src/solver/limbs.rs

use super::{solve_joint, RotationResult};
use crate::frames::layout::{hand_landmark, pose_landmark};
use crate::frames::LandmarkFrame;
use crate::geometry::{make_basis, normalize, quaternion_from_rotation, rotation_from_quaternion};
use crate::skeleton::{BoneRole, Finger, ResolvedSkeleton, Side};
use crate::types::{Mat4, Vec3};
use tracing::debug;

// --- Arms ---

/// Solves shoulder, up-arm and low-arm of one side as a chain seeded with the
/// hip rotation.
///
/// # Arguments
/// * `inside`: Start of the clavicle, see [`super::torso::TorsoAnchors::shoulder_inside`].
/// * `r_hips`: Rotation of the hips.
///
/// # Returns
/// The accumulated rotation at the low arm, which seeds the hand. `None` if
/// the model lacks any of the arm's bind offsets.
pub(crate) fn solve_arm(
    skeleton: &ResolvedSkeleton,
    body: &LandmarkFrame,
    side: Side,
    inside: &Vec3,
    r_hips: &Mat4,
    result: &mut RotationResult,
) -> Option<Mat4> {
    let landmark = |role: BoneRole| pose_landmark(role).map(|id| body.point(id));

    let shoulder = landmark(BoneRole::Shoulder(side))?;
    let elbow = landmark(BoneRole::UpArm(side))?;
    let wrist = landmark(BoneRole::LowArm(side))?;

    let links = [
        (BoneRole::Shoulder(side), BoneRole::UpArm(side), *inside, shoulder),
        (BoneRole::UpArm(side), BoneRole::LowArm(side), shoulder, elbow),
        (BoneRole::LowArm(side), BoneRole::Hand(side), elbow, wrist),
    ];

    let mut chain = *r_hips;
    for (role, child, from, to) in links {
        let Some(bind) = skeleton.translation(child) else {
            debug!(%role, %child, "missing bind offset, arm left unsolved");
            return None;
        };
        let joint = solve_joint(&chain, &bind, &from, &to);
        result.set(role, joint.local);
        chain = joint.accumulated;
    }
    Some(chain)
}

// --- Hands ---

/// Rotation basis of a palm: `v` along wrist to middle knuckle, `w` normal to
/// the palm, `u` completing the frame.
fn palm_basis(wrist_to_middle: &Vec3, index_to_pinky: &Vec3) -> Mat4 {
    let v = normalize(wrist_to_middle);
    let w = normalize(&normalize(index_to_pinky).cross(&v));
    let u = v.cross(&w);
    make_basis(&u, &v, &w)
}

/// Solves the hand from its palm and then the three joints of every finger.
///
/// The hand rotation is the bind palm turned onto the observed palm,
/// expressed relative to the low arm. Each finger then chains from the hand.
/// A finger stops at the first segment whose child has no bind offset.
pub(crate) fn solve_hand(
    skeleton: &ResolvedSkeleton,
    hand: &LandmarkFrame,
    side: Side,
    r_low_arm: &Mat4,
    result: &mut RotationResult,
) {
    let point = |role: BoneRole| hand_landmark(role).map(|id| hand.point(id));
    let base = |finger: Finger| BoneRole::Phalanx(side, finger, 1);

    let (Some(wrist), Some(index), Some(middle), Some(pinky)) = (
        point(BoneRole::Hand(side)),
        point(base(Finger::Index)),
        point(base(Finger::Middle)),
        point(base(Finger::Pinky)),
    ) else {
        return;
    };
    let (Some(bind_index), Some(bind_middle), Some(bind_pinky)) = (
        skeleton.translation(base(Finger::Index)),
        skeleton.translation(base(Finger::Middle)),
        skeleton.translation(base(Finger::Pinky)),
    ) else {
        debug!(side = side.name(), "palm bones missing, hand left unsolved");
        return;
    };

    let observed = palm_basis(&(middle - wrist), &(pinky - index));
    let rest = palm_basis(&bind_middle, &(bind_pinky - bind_index));

    let local = r_low_arm.transpose() * observed * rest.transpose();
    let q_hand = quaternion_from_rotation(&local);
    result.set(BoneRole::Hand(side), q_hand);
    let r_hand = r_low_arm * rotation_from_quaternion(&q_hand);

    for finger in Finger::ALL {
        let mut chain = r_hand;
        for segment in 1..=3u8 {
            let role = BoneRole::Phalanx(side, finger, segment);
            let child = BoneRole::Phalanx(side, finger, segment + 1);
            let (Some(from), Some(to)) = (point(role), point(child)) else {
                break;
            };
            let Some(bind) = skeleton.translation(child) else {
                debug!(%role, "finger ends early");
                break;
            };
            let joint = solve_joint(&chain, &bind, &from, &to);
            result.set(role, joint.local);
            chain = joint.accumulated;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn palm_basis_is_orthonormal() {
        let basis = palm_basis(&Vec3::new(0.1, 0.9, 0.05), &Vec3::new(-0.4, 0.1, 0.2));
        let r = basis.fixed_view::<3, 3>(0, 0);
        assert_abs_diff_eq!(r.transpose() * r, nalgebra::Matrix3::identity(), epsilon = 1e-12);
        assert_abs_diff_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn palm_basis_follows_the_middle_finger() {
        let basis = palm_basis(&Vec3::new(0.0, 2.0, 0.0), &Vec3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(basis, Mat4::identity(), epsilon = 1e-12);
    }
}
