// kinemorph_core/src/skeleton/mod.rs

//! Model node hierarchies and their mapping onto canonical bone roles.

use crate::geometry::{decompose_matrix, Trs};
use crate::types::{Mat4, Quat, Vec3};
use std::collections::BTreeMap;

pub mod container;
pub mod resolver;
pub mod roles;

pub use container::{load_glb, parse_glb};
pub use resolver::resolve;
pub use roles::{BoneRole, Finger, Side};

/// How a node's bind-pose transform relative to its parent is stored.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTransform {
    Matrix(Mat4),
    Trs(Trs),
}

/// One node of a model's scene hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonNode {
    /// Unnamed nodes are walked through but never matched to a role.
    pub name: Option<String>,
    /// Indices into the same node list.
    pub children: Vec<usize>,
    pub transform: NodeTransform,
}

impl SkeletonNode {
    pub fn new(name: impl Into<String>, children: Vec<usize>, transform: NodeTransform) -> Self {
        Self {
            name: Some(name.into()),
            children,
            transform,
        }
    }

    /// The bind pose as translation, rotation and scale.
    pub fn bind_pose(&self) -> Trs {
        match &self.transform {
            NodeTransform::Matrix(m) => decompose_matrix(m),
            NodeTransform::Trs(trs) => *trs,
        }
    }
}

/// A role's node together with that node's bind pose.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBone {
    pub node_index: usize,
    pub node_name: String,
    pub bind: Trs,
}

/// The canonical roles a model provides, each bound to a distinct node.
///
/// Built once per model by [`resolve`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedSkeleton {
    bones: BTreeMap<BoneRole, ResolvedBone>,
}

impl ResolvedSkeleton {
    pub(crate) fn insert(&mut self, role: BoneRole, bone: ResolvedBone) {
        self.bones.insert(role, bone);
    }

    pub fn bone(&self, role: BoneRole) -> Option<&ResolvedBone> {
        self.bones.get(&role)
    }

    pub fn contains(&self, role: BoneRole) -> bool {
        self.bones.contains_key(&role)
    }

    pub fn node_name(&self, role: BoneRole) -> Option<&str> {
        self.bone(role).map(|b| b.node_name.as_str())
    }

    /// Bind translation of the role's node relative to its parent. For a child
    /// bone this is the rest direction of the parent bone.
    pub fn translation(&self, role: BoneRole) -> Option<Vec3> {
        self.bone(role).map(|b| b.bind.translation)
    }

    pub fn rotation(&self, role: BoneRole) -> Option<Quat> {
        self.bone(role).map(|b| b.bind.rotation)
    }

    /// Every resolved role with its node name, in role order.
    pub fn mapping(&self) -> Vec<(BoneRole, &str)> {
        self.bones
            .iter()
            .map(|(role, bone)| (*role, bone.node_name.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::compose_matrix;
    use approx::assert_abs_diff_eq;

    #[test]
    fn matrix_nodes_are_decomposed() {
        let translation = Vec3::new(0.0, 0.25, 0.01);
        let m = compose_matrix(&translation, &Quat::identity(), &Vec3::repeat(1.0));
        let node = SkeletonNode::new("LeftHand", vec![], NodeTransform::Matrix(m));
        assert_abs_diff_eq!(node.bind_pose().translation, translation, epsilon = 1e-12);
    }

    #[test]
    fn mapping_is_ordered_by_role() {
        let mut skeleton = ResolvedSkeleton::default();
        for (i, role) in [BoneRole::Hips, BoneRole::Head].into_iter().enumerate() {
            skeleton.insert(
                role,
                ResolvedBone {
                    node_index: i,
                    node_name: format!("node{i}"),
                    bind: Trs::default(),
                },
            );
        }
        let mapping = skeleton.mapping();
        assert_eq!(mapping[0], (BoneRole::Head, "node1"));
        assert_eq!(mapping[1], (BoneRole::Hips, "node0"));
        assert_eq!(skeleton.node_name(BoneRole::Neck), None);
    }
}
