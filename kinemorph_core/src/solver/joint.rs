// kinemorph_core/src/solver/joint.rs

use crate::geometry::{align_rotation, apply_matrix, normalize, quaternion_from_rotation};
use crate::types::{Mat4, Quat, Vec3};

/// Result of solving one joint of a kinematic chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSolution {
    /// Rotation of the bone relative to its parent.
    pub local: Quat,
    /// Parent rotation followed by the local one, to seed the next joint.
    pub accumulated: Mat4,
}

/// Rotates a bone so that its rest direction points along the observed one.
///
/// # Arguments
/// * `parent_rotation`: Accumulated rotation of everything above this joint.
/// * `bind_child_offset`: Rest position of the child joint relative to this
///   one, i.e. the bone's rest direction in its parent's frame.
/// * `joint_landmark`, `child_landmark`: Observed world positions of this
///   joint and of its child.
///
/// # Returns
/// The local rotation taking the rest direction onto the observed direction
/// expressed in the parent frame, and the new accumulated rotation.
pub fn solve_joint(
    parent_rotation: &Mat4,
    bind_child_offset: &Vec3,
    joint_landmark: &Vec3,
    child_landmark: &Vec3,
) -> JointSolution {
    let direction = normalize(&(child_landmark - joint_landmark));
    let local_direction = apply_matrix(&parent_rotation.transpose(), &direction);
    let local = align_rotation(bind_child_offset, &local_direction);

    JointSolution {
        local: quaternion_from_rotation(&local),
        accumulated: parent_rotation * local,
    }
}
