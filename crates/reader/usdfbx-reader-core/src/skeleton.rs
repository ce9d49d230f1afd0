//! Joint hierarchies: collection, joint path tokens and rest/bind matrices.
//!
//! A hierarchy starts at a topmost joint (a joint whose parent is not a joint) and holds
//! every joint reachable through joint-only chains, in depth-first pre-order. A non-joint
//! child breaks its branch: it and its subtree are left out and recorded as excluded.

use usdfbx_api_core::{clean_name, Matrix4};

use crate::ids::{AnimLayerId, NodeId};
use crate::source::transform::{to_matrix4, without_scale_scaled};
use crate::source::SourceScene;

/// Walk up from `joint` while the parent is itself a joint.
pub fn topmost_joint(scene: &SourceScene, joint: NodeId) -> NodeId {
    let mut current = joint;
    while let Some(parent) = scene.parent(current) {
        if !scene.is_skeleton(parent) {
            break;
        }
        current = parent;
    }
    current
}

/// `Root/Child/...` path of `joint` from the topmost joint of its chain.
pub fn joint_token(scene: &SourceScene, joint: NodeId) -> String {
    let mut segments = vec![clean_name(scene.name(joint))];
    let mut current = joint;
    while let Some(parent) = scene.parent(current) {
        if !scene.is_skeleton(current) || !scene.is_skeleton(parent) {
            break;
        }
        segments.push(clean_name(scene.name(parent)));
        current = parent;
    }
    segments.reverse();
    segments.join("/")
}

/// Which transform a joint matrix is taken from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Space {
    /// Parent-relative; translation rescaled by the unit conversion factor.
    Local,
    /// Scene-relative; translation left as authored.
    World,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JointHierarchy {
    /// Pre-order; the first entry is the topmost joint.
    pub joints: Vec<NodeId>,
    /// Non-joint children that cut a branch short.
    pub excluded: Vec<NodeId>,
}

impl JointHierarchy {
    /// Collect the joints under `root`.
    pub fn collect(scene: &SourceScene, root: NodeId) -> Self {
        let mut joints = vec![root];
        let mut excluded = Vec::new();
        let mut stack: Vec<NodeId> = scene.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !scene.is_skeleton(id) {
                excluded.push(id);
                continue;
            }
            joints.push(id);
            stack.extend(scene.children(id).iter().rev().copied());
        }
        Self { joints, excluded }
    }

    pub fn root(&self) -> NodeId {
        self.joints[0]
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn tokens(&self, scene: &SourceScene) -> Vec<String> {
        self.joints.iter().map(|j| joint_token(scene, *j)).collect()
    }

    /// One matrix per joint with scale forced to one. `factor` applies to local
    /// translations only.
    pub fn matrices(
        &self,
        scene: &SourceScene,
        space: Space,
        layer: Option<AnimLayerId>,
        frame: f64,
        factor: f64,
    ) -> Vec<Matrix4> {
        self.joints
            .iter()
            .map(|j| {
                let m = match space {
                    Space::Local => {
                        without_scale_scaled(scene.local_transform(*j, layer, frame), factor)
                    }
                    Space::World => {
                        without_scale_scaled(scene.global_transform(*j, layer, frame), 1.0)
                    }
                };
                to_matrix4(m)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{names, NodeAttribute, SourceNode, SourceProperty, SourceType, SourceValue};

    fn joint(name: &str, tx: f64) -> SourceNode {
        let mut node = SourceNode::new(name, NodeAttribute::Skeleton);
        node.set_property(SourceProperty::new(
            names::LCL_TRANSLATION,
            SourceType::Double3,
            SourceValue::Numbers(vec![tx, 0.0, 0.0]),
        ));
        node.set_property(SourceProperty::new(
            names::LCL_SCALING,
            SourceType::Double3,
            SourceValue::Numbers(vec![3.0, 3.0, 3.0]),
        ));
        node
    }

    #[test]
    fn chain_paths_stop_at_topmost_joint() {
        let mut scene = SourceScene::default();
        let grp = scene
            .add_node(scene.root(), SourceNode::new("Rig", NodeAttribute::Null))
            .unwrap();
        let a = scene.add_node(grp, joint("A", 1.0)).unwrap();
        let b = scene.add_node(a, joint("B", 2.0)).unwrap();
        let c = scene.add_node(b, joint("C", 3.0)).unwrap();

        assert_eq!(topmost_joint(&scene, c), a);
        assert_eq!(joint_token(&scene, a), "A");
        assert_eq!(joint_token(&scene, b), "A/B");
        assert_eq!(joint_token(&scene, c), "A/B/C");

        let h = JointHierarchy::collect(&scene, a);
        assert_eq!(h.joints, vec![a, b, c]);
        assert_eq!(h.tokens(&scene), vec!["A", "A/B", "A/B/C"]);
        assert!(h.excluded.is_empty());
    }

    #[test]
    fn non_joint_breaks_the_branch() {
        let mut scene = SourceScene::default();
        let a = scene.add_node(scene.root(), joint("A", 0.0)).unwrap();
        let b = scene
            .add_node(a, SourceNode::new("B", NodeAttribute::Null))
            .unwrap();
        scene.add_node(b, joint("C", 0.0)).unwrap();
        let d = scene.add_node(a, joint("D", 0.0)).unwrap();

        let h = JointHierarchy::collect(&scene, a);
        assert_eq!(h.joints, vec![a, d]);
        assert_eq!(h.excluded, vec![b]);
    }

    #[test]
    fn preorder_visits_siblings_in_authoring_order() {
        let mut scene = SourceScene::default();
        let a = scene.add_node(scene.root(), joint("A", 0.0)).unwrap();
        let b = scene.add_node(a, joint("B", 0.0)).unwrap();
        let b1 = scene.add_node(b, joint("B1", 0.0)).unwrap();
        let c = scene.add_node(a, joint("C", 0.0)).unwrap();
        let h = JointHierarchy::collect(&scene, a);
        assert_eq!(h.joints, vec![a, b, b1, c]);
    }

    #[test]
    fn local_translation_is_rescaled_world_is_not() {
        let mut scene = SourceScene::default();
        let a = scene.add_node(scene.root(), joint("A", 1.0)).unwrap();
        let b = scene.add_node(a, joint("B", 2.0)).unwrap();
        let h = JointHierarchy::collect(&scene, a);

        let local = h.matrices(&scene, Space::Local, None, 0.0, 10.0);
        assert_eq!(local[1][3][0], 20.0);
        assert!((local[1][0][0] - 1.0).abs() < 1e-9);

        let world = h.matrices(&scene, Space::World, None, 0.0, 10.0);
        // B sits at A's translation plus A's scaled offset.
        assert!((world[1][3][0] - 7.0).abs() < 1e-9);
        assert!((world[1][0][0] - 1.0).abs() < 1e-9);
        assert_eq!(b, h.joints[1]);
    }
}
