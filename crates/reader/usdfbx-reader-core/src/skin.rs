//! Skin deformer flattening into fixed-width, per-vertex joint influences.

use usdfbx_api_core::{clean_name, PathError, ScenePath};

use crate::diagnostics::Diagnostics;
use crate::ids::NodeId;
use crate::skeleton::{joint_token, topmost_joint};
use crate::source::{Skin, SourceScene};

/// Flattened joint influences of one mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingData {
    /// Joint tokens of the clusters that were converted, in cluster order.
    pub joints: Vec<String>,
    /// `influences_per_vertex` entries per control point, indexing `joints`.
    pub joint_indices: Vec<i32>,
    /// Paired with `joint_indices`; normalized and sorted by descending weight per vertex.
    pub joint_weights: Vec<f32>,
    pub influences_per_vertex: usize,
    pub skeleton_path: ScenePath,
}

impl BindingData {
    fn empty() -> Self {
        Self {
            joints: Vec::new(),
            joint_indices: Vec::new(),
            joint_weights: Vec::new(),
            influences_per_vertex: 0,
            skeleton_path: ScenePath::absolute_root(),
        }
    }

    /// Index/weight pairs of one control point.
    pub fn influences(&self, control_point: usize) -> impl Iterator<Item = (i32, f32)> + '_ {
        let n = self.influences_per_vertex;
        let start = control_point * n;
        let end = (start + n).min(self.joint_indices.len());
        let start = start.min(end);
        self.joint_indices[start..end]
            .iter()
            .copied()
            .zip(self.joint_weights[start..end].iter().copied())
    }
}

/// Scale each group of `width` weights to sum to one. All-zero groups stay zero.
pub fn normalize_weights(weights: &mut [f32], width: usize) {
    if width == 0 {
        return;
    }
    for group in weights.chunks_mut(width) {
        let sum: f32 = group.iter().sum();
        if sum > f32::EPSILON {
            for w in group.iter_mut() {
                *w /= sum;
            }
        }
    }
}

/// Order each group of `width` influences by descending weight, keeping pairs together.
/// Equal weights keep their relative order.
pub fn sort_influences(indices: &mut [i32], weights: &mut [f32], width: usize) {
    if width == 0 {
        return;
    }
    for (idx, w) in indices.chunks_mut(width).zip(weights.chunks_mut(width)) {
        let mut pairs: Vec<(i32, f32)> = idx.iter().copied().zip(w.iter().copied()).collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (slot, (i, weight)) in pairs.into_iter().enumerate() {
            idx[slot] = i;
            w[slot] = weight;
        }
    }
}

/// Flatten `skin` for a mesh of `control_points` points.
///
/// Joint indices refer to the list of converted clusters. A cluster that is unlinked or
/// linked to a node that is not a joint is reported and takes no slot. The skeleton path is
/// `/<root_prim>/<ancestors of the topmost joint>/<topmost joint>`, resolved from the first
/// cluster bound to a joint.
pub fn extract(
    scene: &SourceScene,
    mesh_node: NodeId,
    skin: &Skin,
    control_points: usize,
    root_prim: &ScenePath,
    diagnostics: &mut Diagnostics,
) -> Result<BindingData, PathError> {
    let Some(first_link) = skin
        .clusters
        .iter()
        .filter_map(|c| c.link)
        .find(|link| scene.is_skeleton(*link))
    else {
        for (n, cluster) in skin.clusters.iter().enumerate() {
            warn_unresolved(scene, mesh_node, n, cluster.link, diagnostics);
        }
        return Ok(BindingData::empty());
    };
    let root_joint = topmost_joint(scene, first_link);

    let mut joints = Vec::with_capacity(skin.clusters.len());
    let mut per_vertex: Vec<Vec<(i32, f32)>> = vec![Vec::new(); control_points];
    let mut width = 0;
    for (n, cluster) in skin.clusters.iter().enumerate() {
        let link = match cluster.link {
            Some(link) if scene.is_skeleton(link) => link,
            other => {
                warn_unresolved(scene, mesh_node, n, other, diagnostics);
                continue;
            }
        };
        if cluster.indices.len() != cluster.weights.len() {
            diagnostics.warn(
                Some(mesh_node),
                None,
                format!(
                    "cluster bound to \"{}\" has {} indices but {} weights",
                    scene.name(link),
                    cluster.indices.len(),
                    cluster.weights.len()
                ),
            );
        }
        let joint_index = joints.len() as i32;
        for (cp, weight) in cluster.influences() {
            let Some(list) = per_vertex.get_mut(cp) else {
                diagnostics.warn(
                    Some(mesh_node),
                    None,
                    format!(
                        "cluster bound to \"{}\" weights control point {cp} of a {control_points}-point mesh",
                        scene.name(link)
                    ),
                );
                continue;
            };
            list.push((joint_index, weight as f32));
            width = width.max(list.len());
        }
        joints.push(joint_token(scene, link));
    }

    let mut joint_indices = Vec::with_capacity(control_points * width);
    let mut joint_weights = Vec::with_capacity(control_points * width);
    for list in &per_vertex {
        for slot in 0..width {
            let (index, weight) = list.get(slot).copied().unwrap_or((0, 0.0));
            joint_indices.push(index);
            joint_weights.push(weight);
        }
    }
    normalize_weights(&mut joint_weights, width);
    sort_influences(&mut joint_indices, &mut joint_weights, width);

    let mut skeleton_path = root_prim.clone();
    let mut chain: Vec<String> = scene
        .ancestors(root_joint)
        .map(|a| clean_name(scene.name(a)))
        .collect();
    chain.reverse();
    chain.push(clean_name(scene.name(root_joint)));
    for name in &chain {
        skeleton_path = skeleton_path.append_child(name)?;
    }

    Ok(BindingData {
        joints,
        joint_indices,
        joint_weights,
        influences_per_vertex: width,
        skeleton_path,
    })
}

fn warn_unresolved(
    scene: &SourceScene,
    mesh_node: NodeId,
    cluster: usize,
    link: Option<NodeId>,
    diagnostics: &mut Diagnostics,
) {
    let message = match link {
        Some(link) => format!(
            "skin cluster {cluster} is bound to \"{}\", which is not a joint; its weights are dropped",
            scene.name(link)
        ),
        None => format!("skin cluster {cluster} has no bound joint; its weights are dropped"),
    };
    diagnostics.warn(Some(mesh_node), None, message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Cluster, NodeAttribute, SourceNode};

    fn rig() -> (SourceScene, NodeId, NodeId, NodeId) {
        let mut scene = SourceScene::default();
        let grp = scene
            .add_node(scene.root(), SourceNode::new("Rig", NodeAttribute::Null))
            .unwrap();
        let j = scene
            .add_node(grp, SourceNode::new("J", NodeAttribute::Skeleton))
            .unwrap();
        let k = scene
            .add_node(j, SourceNode::new("K", NodeAttribute::Skeleton))
            .unwrap();
        let mesh = scene
            .add_node(scene.root(), SourceNode::new("Body", NodeAttribute::Null))
            .unwrap();
        (scene, mesh, j, k)
    }

    fn root() -> ScenePath {
        ScenePath::parse("/ROOT").unwrap()
    }

    #[test]
    fn two_clusters_over_four_points() {
        let (scene, mesh, j, k) = rig();
        let skin = Skin {
            clusters: vec![
                Cluster::new(j, &[(0, 1.0), (1, 0.5)]),
                Cluster::new(k, &[(1, 0.5), (2, 1.0)]),
            ],
        };
        let mut diags = Diagnostics::new();
        let b = extract(&scene, mesh, &skin, 4, &root(), &mut diags).unwrap();

        assert_eq!(b.joints, vec!["J", "J/K"]);
        assert_eq!(b.influences_per_vertex, 2);
        assert_eq!(b.joint_indices.len(), 8);
        assert_eq!(b.joint_indices, vec![0, 0, 0, 1, 1, 0, 0, 0]);
        assert_eq!(b.joint_weights, vec![1.0, 0.0, 0.5, 0.5, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(b.skeleton_path.to_string(), "/ROOT/Rig/J");
        assert!(diags.is_empty());
    }

    #[test]
    fn weights_normalize_and_sort_descending() {
        let (scene, mesh, j, k) = rig();
        let skin = Skin {
            clusters: vec![
                Cluster::new(j, &[(0, 0.1)]),
                Cluster::new(k, &[(0, 0.3)]),
            ],
        };
        let b = extract(&scene, mesh, &skin, 1, &root(), &mut Diagnostics::new()).unwrap();
        let pairs: Vec<(i32, f32)> = b.influences(0).collect();
        assert_eq!(pairs[0].0, 1);
        assert_eq!(pairs[1].0, 0);
        assert!((pairs[0].1 - 0.75).abs() < 1e-6);
        assert!((pairs[1].1 - 0.25).abs() < 1e-6);
        let sum: f32 = pairs.iter().map(|p| p.1).sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn no_clusters_gives_empty_binding() {
        let (scene, mesh, _, _) = rig();
        let b = extract(&scene, mesh, &Skin::default(), 4, &root(), &mut Diagnostics::new())
            .unwrap();
        assert!(b.joints.is_empty());
        assert!(b.joint_indices.is_empty());
        assert_eq!(b.influences_per_vertex, 0);
        assert!(b.skeleton_path.is_absolute_root());
    }

    #[test]
    fn unbound_clusters_take_no_slot() {
        let (scene, mesh, j, k) = rig();
        let skin = Skin {
            clusters: vec![
                Cluster {
                    link: None,
                    indices: vec![0],
                    weights: vec![1.0],
                },
                Cluster::new(k, &[(0, 1.0)]),
                Cluster::new(j, &[(1, 1.0), (7, 1.0)]),
            ],
        };
        let mut diags = Diagnostics::new();
        let b = extract(&scene, mesh, &skin, 2, &root(), &mut diags).unwrap();
        assert_eq!(b.joints, vec!["J/K", "J"]);
        assert_eq!(b.joint_indices, vec![0, 1]);
        assert_eq!(b.skeleton_path.to_string(), "/ROOT/Rig/J");
        // The unlinked cluster and control point 7.
        assert_eq!(diags.warnings().count(), 2);
    }

    #[test]
    fn unresolvable_clusters_warn_and_take_no_slot() {
        let (scene, mesh, j, _) = rig();
        let skin = Skin {
            clusters: vec![
                Cluster::new(j, &[(0, 1.0)]),
                Cluster {
                    link: None,
                    indices: vec![1],
                    weights: vec![1.0],
                },
                Cluster::new(mesh, &[(1, 1.0)]),
            ],
        };
        let mut diags = Diagnostics::new();
        let b = extract(&scene, mesh, &skin, 2, &root(), &mut diags).unwrap();
        assert_eq!(b.joints, vec!["J"]);
        assert_eq!(b.influences_per_vertex, 1);
        assert_eq!(b.joint_indices, vec![0, 0]);
        assert_eq!(b.joint_weights, vec![1.0, 0.0]);

        let warnings: Vec<_> = diags.warnings().collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.node == Some(mesh)));
        assert!(warnings[0].message.contains("no bound joint"));
        assert!(warnings[1].message.contains("\"Body\", which is not a joint"));
    }

    #[test]
    fn only_non_joint_links_give_empty_binding() {
        let (scene, mesh, _, _) = rig();
        let skin = Skin {
            clusters: vec![Cluster::new(mesh, &[(0, 1.0)])],
        };
        let mut diags = Diagnostics::new();
        let b = extract(&scene, mesh, &skin, 1, &root(), &mut diags).unwrap();
        assert!(b.joints.is_empty());
        assert_eq!(diags.warnings().count(), 1);
    }

    #[test]
    fn normalize_leaves_zero_groups() {
        let mut w = vec![0.0, 0.0, 2.0, 2.0];
        normalize_weights(&mut w, 2);
        assert_eq!(w, vec![0.0, 0.0, 0.5, 0.5]);
    }
}
