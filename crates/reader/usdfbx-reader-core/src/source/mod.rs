//! Read-only source scene: an arena of nodes addressed by [`NodeId`].
//!
//! Node 0 is the scene root. It carries no attribute and is never converted itself; its
//! children are the top-level nodes. Scenes are built through the methods here or
//! deserialized from JSON, in which case parent links are validated and child lists
//! rebuilt in node order.

pub mod camera;
pub mod curve;
pub mod mesh;
pub mod property;
pub mod transform;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::ids::{AnimLayerId, NodeId};
use crate::sampling::FrameRange;

pub use camera::{Camera, Projection};
pub use curve::{AnimCurve, CurveKey, Interpolation};
pub use mesh::{Cluster, LayerElement, MappingMode, Mesh, MeshLayer, ReferenceMode, Skin};
pub use property::{names, CurveNode, SourceProperty, SourceType, SourceValue};

#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationOrder {
    #[default]
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
    SphericXYZ,
}

impl RotationOrder {
    /// Axis letters in application order; SphericXYZ reads as XYZ.
    pub fn axes(self) -> &'static str {
        match self {
            RotationOrder::XYZ | RotationOrder::SphericXYZ => "XYZ",
            RotationOrder::XZY => "XZY",
            RotationOrder::YXZ => "YXZ",
            RotationOrder::YZX => "YZX",
            RotationOrder::ZXY => "ZXY",
            RotationOrder::ZYX => "ZYX",
        }
    }
}

/// Coarse attribute kind used as the dispatch key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKind {
    Null,
    Mesh,
    Skeleton,
    Camera,
    Unknown,
    Nurbs,
    Patch,
    CameraStereo,
    CameraSwitcher,
    Light,
    OpticalReference,
    OpticalMarker,
    NurbsCurve,
    TrimNurbsSurface,
    Boundary,
    NurbsSurface,
    Shape,
    LodGroup,
    SubDiv,
    CachedEffect,
    Line,
}

/// The attribute a node carries. `Null` is a plain transform.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum NodeAttribute {
    #[default]
    Null,
    Mesh(Box<Mesh>),
    Skeleton,
    Camera(Box<Camera>),
    Unknown,
    /// Recognized kinds that carry no convertible payload.
    Unsupported(AttributeKind),
}

impl NodeAttribute {
    pub fn kind(&self) -> AttributeKind {
        match self {
            NodeAttribute::Null => AttributeKind::Null,
            NodeAttribute::Mesh(_) => AttributeKind::Mesh,
            NodeAttribute::Skeleton => AttributeKind::Skeleton,
            NodeAttribute::Camera(_) => AttributeKind::Camera,
            NodeAttribute::Unknown => AttributeKind::Unknown,
            NodeAttribute::Unsupported(kind) => *kind,
        }
    }
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    pub name: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(skip)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub attribute: NodeAttribute,
    #[serde(default)]
    pub rotation_order: RotationOrder,
    #[serde(default)]
    pub geometric_translation: [f64; 3],
    /// Euler degrees, XYZ.
    #[serde(default)]
    pub geometric_rotation: [f64; 3],
    #[serde(default = "unit_scale")]
    pub geometric_scaling: [f64; 3],
    #[serde(default)]
    pub properties: Vec<SourceProperty>,
}

impl SourceNode {
    pub fn new(name: impl Into<String>, attribute: NodeAttribute) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            attribute,
            rotation_order: RotationOrder::XYZ,
            geometric_translation: [0.0; 3],
            geometric_rotation: [0.0; 3],
            geometric_scaling: unit_scale(),
            properties: Vec::new(),
        }
    }

    pub fn kind(&self) -> AttributeKind {
        self.attribute.kind()
    }

    pub fn is_skeleton(&self) -> bool {
        matches!(self.attribute, NodeAttribute::Skeleton)
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.attribute {
            NodeAttribute::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn camera(&self) -> Option<&Camera> {
        match &self.attribute {
            NodeAttribute::Camera(c) => Some(c),
            _ => None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&SourceProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Add `prop`, replacing any property with the same name.
    pub fn set_property(&mut self, prop: SourceProperty) {
        match self.properties.iter_mut().find(|p| p.name == prop.name) {
            Some(slot) => *slot = prop,
            None => self.properties.push(prop),
        }
    }

    pub fn user_properties(&self) -> impl Iterator<Item = &SourceProperty> {
        self.properties.iter().filter(|p| p.user_defined)
    }

    /// Channel values of `name` at `frame`, falling back to the well-known default when the
    /// node does not carry the property.
    pub fn evaluate(&self, name: &str, layer: Option<AnimLayerId>, frame: f64) -> Vec<f64> {
        match self.property(name) {
            Some(p) => p.evaluate(layer, frame),
            None => names::fallback(name),
        }
    }

    /// First channel of [`evaluate`](Self::evaluate).
    pub fn evaluate_scalar(&self, name: &str, layer: Option<AnimLayerId>, frame: f64) -> f64 {
        self.evaluate(name, layer, frame)
            .first()
            .copied()
            .unwrap_or(0.0)
    }

    /// Three channels of [`evaluate`](Self::evaluate), zero-padded.
    pub fn evaluate_vec3(&self, name: &str, layer: Option<AnimLayerId>, frame: f64) -> [f64; 3] {
        let v = self.evaluate(name, layer, frame);
        let c = |i: usize| v.get(i).copied().unwrap_or(0.0);
        [c(0), c(1), c(2)]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Centimetres per scene unit.
    pub system_unit: f64,
    /// Centimetres per unit the scene was originally authored in.
    pub original_system_unit: f64,
    pub frame_rate: f64,
    pub timeline: Option<FrameRange>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            system_unit: 1.0,
            original_system_unit: 1.0,
            frame_rate: 24.0,
            timeline: None,
        }
    }
}

impl SceneSettings {
    /// Factor converting lengths authored in the original unit into the scene unit.
    pub fn conversion_factor(&self) -> f64 {
        if self.system_unit > 0.0 {
            self.original_system_unit / self.system_unit
        } else {
            1.0
        }
    }

    /// Millimetres expressed in tenths of a scene unit.
    pub fn to_tenths_of_scene_unit(&self, millimetres: f64) -> f64 {
        if self.system_unit > 0.0 {
            millimetres / self.system_unit
        } else {
            millimetres
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimLayer {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SceneData")]
pub struct SourceScene {
    pub settings: SceneSettings,
    pub anim_layers: Vec<AnimLayer>,
    nodes: Vec<SourceNode>,
}

#[derive(Deserialize)]
struct SceneData {
    #[serde(default)]
    settings: SceneSettings,
    #[serde(default)]
    anim_layers: Vec<AnimLayer>,
    nodes: Vec<SourceNode>,
}

impl TryFrom<SceneData> for SourceScene {
    type Error = SceneError;

    fn try_from(data: SceneData) -> Result<Self, Self::Error> {
        let mut scene = SourceScene {
            settings: data.settings,
            anim_layers: data.anim_layers,
            nodes: data.nodes,
        };
        scene.link()?;
        Ok(scene)
    }
}

impl Default for SourceScene {
    fn default() -> Self {
        Self::new(SceneSettings::default())
    }
}

impl SourceScene {
    /// An empty scene holding only the root node.
    pub fn new(settings: SceneSettings) -> Self {
        Self {
            settings,
            anim_layers: Vec::new(),
            nodes: vec![SourceNode::new("RootNode", NodeAttribute::Null)],
        }
    }

    pub const ROOT: NodeId = NodeId(0);

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Rebuild child lists from parent links and check that every node hangs off the root.
    fn link(&mut self) -> Result<(), SceneError> {
        let root = self.nodes.first().ok_or(SceneError::MissingRoot)?;
        if root.parent.is_some() {
            return Err(SceneError::RootHasParent);
        }
        let count = self.nodes.len();
        for node in &mut self.nodes {
            node.children.clear();
        }
        for i in 1..count {
            let id = NodeId(i as u32);
            let parent = self.nodes[i].parent.ok_or(SceneError::Orphan(id))?;
            if parent.index() >= count {
                return Err(SceneError::DanglingReference {
                    node: id,
                    missing: parent,
                });
            }
            self.nodes[parent.index()].children.push(id);
        }
        for (i, node) in self.nodes.iter().enumerate() {
            let id = NodeId(i as u32);
            let links = node
                .mesh()
                .into_iter()
                .flat_map(|m| m.skins.iter())
                .flat_map(|s| s.clusters.iter())
                .filter_map(|c| c.link);
            for link in links {
                if link.index() >= count {
                    return Err(SceneError::DanglingReference {
                        node: id,
                        missing: link,
                    });
                }
            }
        }
        let mut seen = vec![false; count];
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            stack.extend(self.nodes[id.index()].children.iter().copied());
        }
        if let Some(i) = seen.iter().position(|s| !s) {
            return Err(SceneError::Unreachable(NodeId(i as u32)));
        }
        Ok(())
    }

    /// Append a node under `parent`.
    pub fn add_node(&mut self, parent: NodeId, mut node: SourceNode) -> Result<NodeId, SceneError> {
        let id = NodeId(self.nodes.len() as u32);
        let parent_node = self
            .nodes
            .get_mut(parent.index())
            .ok_or(SceneError::DanglingReference {
                node: id,
                missing: parent,
            })?;
        parent_node.children.push(id);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        Ok(id)
    }

    pub fn add_anim_layer(&mut self, name: impl Into<String>) -> AnimLayerId {
        self.anim_layers.push(AnimLayer { name: name.into() });
        AnimLayerId((self.anim_layers.len() - 1) as u32)
    }

    pub fn anim_layer_by_name(&self, name: &str) -> Option<AnimLayerId> {
        self.anim_layers
            .iter()
            .position(|l| l.name == name)
            .map(|i| AnimLayerId(i as u32))
    }

    pub fn node(&self, id: NodeId) -> Option<&SourceNode> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SourceNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SourceNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.node(id).map(|n| n.name.as_str()).unwrap_or("")
    }

    pub fn is_skeleton(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(SourceNode::is_skeleton)
    }

    /// Ancestors of `id`, nearest first, excluding the scene root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
            .take_while(|p| *p != Self::ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_links_children() {
        let mut scene = SourceScene::default();
        let a = scene
            .add_node(scene.root(), SourceNode::new("A", NodeAttribute::Null))
            .unwrap();
        let b = scene
            .add_node(a, SourceNode::new("B", NodeAttribute::Skeleton))
            .unwrap();
        assert_eq!(scene.children(scene.root()), &[a]);
        assert_eq!(scene.children(a), &[b]);
        assert_eq!(scene.parent(b), Some(a));
        assert!(scene.is_skeleton(b));
        assert_eq!(scene.ancestors(b).collect::<Vec<_>>(), vec![a]);
        assert!(scene
            .add_node(NodeId(42), SourceNode::new("C", NodeAttribute::Null))
            .is_err());
    }

    #[test]
    fn json_scene_is_validated() {
        let ok: SourceScene = serde_json::from_str(
            r#"{ "nodes": [
                { "name": "RootNode" },
                { "name": "Cam", "parent": 0, "attribute": { "kind": "camera", "data": {} } },
                { "name": "Light", "parent": 1, "attribute": { "kind": "unsupported", "data": "light" } }
            ] }"#,
        )
        .unwrap();
        assert_eq!(ok.children(NodeId(1)), &[NodeId(2)]);
        assert_eq!(ok.node(NodeId(2)).unwrap().kind(), AttributeKind::Light);
        assert_eq!(ok.node(NodeId(1)).unwrap().camera().unwrap().squeeze_ratio, 1.0);

        let dangling = serde_json::from_str::<SourceScene>(
            r#"{ "nodes": [ { "name": "RootNode" }, { "name": "A", "parent": 7 } ] }"#,
        );
        assert!(dangling.is_err());
        let cycle = serde_json::from_str::<SourceScene>(
            r#"{ "nodes": [ { "name": "RootNode" }, { "name": "A", "parent": 2 }, { "name": "B", "parent": 1 } ] }"#,
        );
        assert!(cycle.is_err());
    }

    #[test]
    fn unit_conversion() {
        let settings = SceneSettings {
            system_unit: 1.0,
            original_system_unit: 100.0,
            ..SceneSettings::default()
        };
        assert_eq!(settings.conversion_factor(), 100.0);
        assert_eq!(settings.to_tenths_of_scene_unit(35.0), 35.0);
    }
}
