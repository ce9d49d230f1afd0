//! Per-frame node transform evaluation.
//!
//! Local transform: `T * Tpivot * R * S * Tpivot^-1` with `R` composed from Euler degrees
//! in the node's rotation order. Global transforms compose up the parent chain; the scene
//! root contributes identity. Matrices use glam's column-vector convention; convert with
//! [`to_matrix4`] for authoring.

use glam::{DMat4, DQuat, DVec3};
use usdfbx_api_core::Matrix4;

use super::property::names;
use super::{RotationOrder, SourceNode, SourceScene};
use crate::ids::{AnimLayerId, NodeId};

/// Rotation from Euler degrees applied axis by axis in `order`.
pub fn euler_to_quat(order: RotationOrder, degrees: [f64; 3]) -> DQuat {
    let axis = |c: char| match c {
        'X' => DQuat::from_rotation_x(degrees[0].to_radians()),
        'Y' => DQuat::from_rotation_y(degrees[1].to_radians()),
        _ => DQuat::from_rotation_z(degrees[2].to_radians()),
    };
    order
        .axes()
        .chars()
        .fold(DQuat::IDENTITY, |acc, c| axis(c) * acc)
}

/// The geometric offset applied to a node's own geometry only (XYZ Euler).
pub fn geometric_transform(node: &SourceNode) -> DMat4 {
    DMat4::from_scale_rotation_translation(
        DVec3::from_array(node.geometric_scaling),
        euler_to_quat(RotationOrder::XYZ, node.geometric_rotation),
        DVec3::from_array(node.geometric_translation),
    )
}

/// Replace the scale of `m` by (1,1,1), keeping rotation and translation.
pub fn without_scale(m: DMat4) -> DMat4 {
    let (_, rotation, translation) = m.to_scale_rotation_translation();
    DMat4::from_rotation_translation(rotation, translation)
}

/// [`without_scale`] with the translation multiplied by `factor`.
pub fn without_scale_scaled(m: DMat4, factor: f64) -> DMat4 {
    let (_, rotation, translation) = m.to_scale_rotation_translation();
    DMat4::from_rotation_translation(rotation, translation * factor)
}

/// Row-major authoring layout (translation in the last row).
pub fn to_matrix4(m: DMat4) -> Matrix4 {
    m.to_cols_array_2d()
}

impl SourceScene {
    /// Local transform of `id` at `frame`; identity for unknown ids and the root.
    pub fn local_transform(&self, id: NodeId, layer: Option<AnimLayerId>, frame: f64) -> DMat4 {
        let Some(node) = self.node(id) else {
            return DMat4::IDENTITY;
        };
        if id == Self::ROOT {
            return DMat4::IDENTITY;
        }
        let t = DVec3::from_array(node.evaluate_vec3(names::LCL_TRANSLATION, layer, frame));
        let r = node.evaluate_vec3(names::LCL_ROTATION, layer, frame);
        let s = DVec3::from_array(node.evaluate_vec3(names::LCL_SCALING, layer, frame));
        let pivot = DVec3::from_array(node.evaluate_vec3(names::ROTATION_PIVOT, layer, frame));
        let rotation = euler_to_quat(node.rotation_order, r);
        DMat4::from_translation(t)
            * DMat4::from_translation(pivot)
            * DMat4::from_quat(rotation)
            * DMat4::from_scale(s)
            * DMat4::from_translation(-pivot)
    }

    /// World transform of `id` at `frame`.
    pub fn global_transform(&self, id: NodeId, layer: Option<AnimLayerId>, frame: f64) -> DMat4 {
        let mut m = self.local_transform(id, layer, frame);
        for ancestor in self.ancestors(id) {
            m = self.local_transform(ancestor, layer, frame) * m;
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{NodeAttribute, SourceProperty, SourceType, SourceValue};

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn euler_order_matters() {
        let xyz = euler_to_quat(RotationOrder::XYZ, [90.0, 90.0, 0.0]);
        let yxz = euler_to_quat(RotationOrder::YXZ, [90.0, 90.0, 0.0]);
        let v = DVec3::new(0.0, 0.0, 1.0);
        // X first sends +Z to -Y, then Y leaves it there.
        assert!(close(xyz * v, DVec3::new(0.0, -1.0, 0.0)));
        // Y first sends +Z to +X, then X leaves it there.
        assert!(close(yxz * v, DVec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn global_composes_parent_chain() {
        let mut scene = SourceScene::default();
        let mut parent = SourceNode::new("P", NodeAttribute::Null);
        parent.set_property(SourceProperty::new(
            names::LCL_TRANSLATION,
            SourceType::Double3,
            SourceValue::Numbers(vec![10.0, 0.0, 0.0]),
        ));
        parent.set_property(SourceProperty::new(
            names::LCL_SCALING,
            SourceType::Double3,
            SourceValue::Numbers(vec![2.0, 2.0, 2.0]),
        ));
        let p = scene.add_node(scene.root(), parent).unwrap();
        let mut child = SourceNode::new("C", NodeAttribute::Null);
        child.set_property(SourceProperty::new(
            names::LCL_TRANSLATION,
            SourceType::Double3,
            SourceValue::Numbers(vec![1.0, 0.0, 0.0]),
        ));
        let c = scene.add_node(p, child).unwrap();

        let g = scene.global_transform(c, None, 0.0);
        assert!(close(g.w_axis.truncate(), DVec3::new(12.0, 0.0, 0.0)));
        let flat = without_scale(g);
        let (s, _, t) = flat.to_scale_rotation_translation();
        assert!(close(s, DVec3::ONE));
        assert!(close(t, DVec3::new(12.0, 0.0, 0.0)));
        let m = to_matrix4(without_scale_scaled(g, 0.5));
        assert_eq!(m[3][0], 6.0);
    }

    #[test]
    fn rotation_pivot_keeps_pivot_fixed() {
        let mut scene = SourceScene::default();
        let mut node = SourceNode::new("N", NodeAttribute::Null);
        node.set_property(SourceProperty::new(
            names::ROTATION_PIVOT,
            SourceType::Double3,
            SourceValue::Numbers(vec![1.0, 0.0, 0.0]),
        ));
        node.set_property(SourceProperty::new(
            names::LCL_ROTATION,
            SourceType::Double3,
            SourceValue::Numbers(vec![0.0, 0.0, 90.0]),
        ));
        let n = scene.add_node(scene.root(), node).unwrap();
        let m = scene.local_transform(n, None, 0.0);
        assert!(close(
            m.transform_point3(DVec3::new(1.0, 0.0, 0.0)),
            DVec3::new(1.0, 0.0, 0.0)
        ));
    }
}
