// kinemorph_core/src/skeleton/resolver.rs

use crate::error::{StructureError, StructureResult};
use crate::skeleton::{BoneRole, ResolvedBone, ResolvedSkeleton, SkeletonNode};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Maps every canonical role onto a node of `nodes`.
///
/// Roles are taken in [`BoneRole::resolution_order`]. Each one is searched for
/// breadth-first from the root, so the shallowest matching node that no
/// earlier role claimed wins. After the first segment of a finger is found,
/// the following segments are searched for inside the subtree of the segment
/// before them, until a segment has no further match.
///
/// # Errors
/// * [`StructureError::DanglingChild`] if a child index is out of range.
/// * [`StructureError::CyclicHierarchy`] if a node is reachable from itself.
/// * [`StructureError::MissingRoot`] / [`StructureError::AmbiguousRoot`] if no
///   single root node can be chosen.
/// * [`StructureError::UnresolvedRole`] if a required role has no match.
pub fn resolve(nodes: &[SkeletonNode]) -> StructureResult<ResolvedSkeleton> {
    check_children(nodes)?;
    check_acyclic(nodes)?;
    let root = find_root(nodes)?;

    let mut skeleton = ResolvedSkeleton::default();
    let mut assigned = HashSet::new();

    for role in BoneRole::resolution_order() {
        let Some(index) = search(nodes, root, role, &assigned) else {
            if role.is_optional() {
                debug!(%role, "optional role not present in model");
                continue;
            }
            return Err(StructureError::UnresolvedRole(role));
        };
        claim(nodes, role, index, &mut skeleton, &mut assigned);

        // Walk outwards along the finger.
        let mut current = index;
        let mut next = role.next_segment();
        while let Some(segment) = next {
            let Some(found) = search(nodes, current, segment, &assigned) else {
                break;
            };
            claim(nodes, segment, found, &mut skeleton, &mut assigned);
            current = found;
            next = segment.next_segment();
        }
    }

    info!(
        root = nodes[root].name.as_deref().unwrap_or_default(),
        bones = skeleton.len(),
        "resolved skeleton"
    );
    Ok(skeleton)
}

fn claim(
    nodes: &[SkeletonNode],
    role: BoneRole,
    index: usize,
    skeleton: &mut ResolvedSkeleton,
    assigned: &mut HashSet<usize>,
) {
    let node = &nodes[index];
    let node_name = node.name.clone().unwrap_or_default();
    debug!(%role, node = %node_name, index, "resolved bone");
    assigned.insert(index);
    skeleton.insert(
        role,
        ResolvedBone {
            node_index: index,
            node_name,
            bind: node.bind_pose(),
        },
    );
}

/// Breadth-first search from `start` (inclusive) for the first unclaimed,
/// named node that matches `role`. Children are visited in stored order.
fn search(
    nodes: &[SkeletonNode],
    start: usize,
    role: BoneRole,
    assigned: &HashSet<usize>,
) -> Option<usize> {
    let mut queue = VecDeque::from([start]);
    while let Some(index) = queue.pop_front() {
        let node = &nodes[index];
        let matches = node
            .name
            .as_deref()
            .is_some_and(|name| role.matches_node_name(name));
        if matches && !assigned.contains(&index) {
            return Some(index);
        }
        queue.extend(node.children.iter().copied());
    }
    None
}

fn check_children(nodes: &[SkeletonNode]) -> StructureResult<()> {
    for (parent, node) in nodes.iter().enumerate() {
        if let Some(&child) = node.children.iter().find(|&&c| c >= nodes.len()) {
            return Err(StructureError::DanglingChild {
                parent,
                child,
                count: nodes.len(),
            });
        }
    }
    Ok(())
}

/// Depth-first walk from every unvisited node. Reaching a node that is still
/// on the current path means the child links form a cycle.
fn check_acyclic(nodes: &[SkeletonNode]) -> StructureResult<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unseen,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unseen; nodes.len()];
    for start in 0..nodes.len() {
        if marks[start] != Mark::Unseen {
            continue;
        }
        marks[start] = Mark::OnPath;
        // (node, index of the next child to visit)
        let mut path = vec![(start, 0usize)];

        while let Some(&(index, cursor)) = path.last() {
            let Some(&child) = nodes[index].children.get(cursor) else {
                marks[index] = Mark::Done;
                path.pop();
                continue;
            };
            let top = path.len() - 1;
            path[top].1 += 1;

            match marks[child] {
                Mark::OnPath => return Err(StructureError::CyclicHierarchy { node: child }),
                Mark::Unseen => {
                    marks[child] = Mark::OnPath;
                    path.push((child, 0));
                }
                Mark::Done => {}
            }
        }
    }
    Ok(())
}

/// The single node with children and no parent. Among several such nodes the
/// first one whose name contains "root" is taken.
fn find_root(nodes: &[SkeletonNode]) -> StructureResult<usize> {
    let mut has_parent = vec![false; nodes.len()];
    for child in nodes.iter().flat_map(|n| n.children.iter()) {
        has_parent[*child] = true;
    }

    let candidates: Vec<usize> = (0..nodes.len())
        .filter(|&i| !has_parent[i] && !nodes[i].children.is_empty())
        .collect();

    match candidates.as_slice() {
        [] => Err(StructureError::MissingRoot),
        [only] => Ok(*only),
        many => {
            let named_root = many.iter().copied().find(|&i| {
                nodes[i]
                    .name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains("root"))
            });
            match named_root {
                Some(index) => {
                    warn!(
                        candidates = many.len(),
                        chosen = nodes[index].name.as_deref().unwrap_or_default(),
                        "several root candidates, preferring the one named root"
                    );
                    Ok(index)
                }
                None => Err(StructureError::AmbiguousRoot(
                    many.iter()
                        .map(|&i| nodes[i].name.clone().unwrap_or_default())
                        .collect(),
                )),
            }
        }
    }
}
