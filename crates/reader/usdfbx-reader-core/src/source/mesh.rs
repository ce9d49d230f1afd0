//! Polygon meshes, their layered attribute elements and skin deformers.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// What a layer element's positions are keyed by.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingMode {
    #[default]
    None,
    ByControlPoint,
    ByPolygonVertex,
    ByPolygon,
    ByEdge,
    AllSame,
}

/// How a position is turned into an index into the direct array.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceMode {
    /// The position indexes the direct array.
    #[default]
    Direct,
    /// Legacy indexed mode; resolves like `IndexToDirect`.
    Index,
    /// The position indexes the index array, whose entry indexes the direct array.
    IndexToDirect,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerElement<T> {
    #[serde(default)]
    pub name: String,
    pub mapping: MappingMode,
    #[serde(default)]
    pub reference: ReferenceMode,
    pub direct: Vec<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index: Vec<usize>,
}

impl<T> LayerElement<T> {
    pub fn direct(mapping: MappingMode, values: Vec<T>) -> Self {
        Self {
            name: String::new(),
            mapping,
            reference: ReferenceMode::Direct,
            direct: values,
            index: Vec::new(),
        }
    }

    pub fn indexed(mapping: MappingMode, values: Vec<T>, index: Vec<usize>) -> Self {
        Self {
            name: String::new(),
            mapping,
            reference: ReferenceMode::IndexToDirect,
            direct: values,
            index,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// One layer of per-mesh attribute elements; any of them may be absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normals: Option<LayerElement<[f64; 3]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tangents: Option<LayerElement<[f64; 3]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uvs: Option<LayerElement<[f64; 2]>>,
    /// RGBA
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_colors: Option<LayerElement<[f64; 4]>>,
}

/// Binds one joint node to a sparse set of weighted control points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Bound joint; clusters without one are skipped.
    #[serde(default)]
    pub link: Option<NodeId>,
    #[serde(default)]
    pub indices: Vec<usize>,
    #[serde(default)]
    pub weights: Vec<f64>,
}

impl Cluster {
    pub fn new(link: NodeId, influences: &[(usize, f64)]) -> Self {
        Self {
            link: Some(link),
            indices: influences.iter().map(|(i, _)| *i).collect(),
            weights: influences.iter().map(|(_, w)| *w).collect(),
        }
    }

    /// (control point, weight) pairs in authoring order.
    pub fn influences(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.weights.iter().copied())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub clusters: Vec<Cluster>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub control_points: Vec<[f64; 3]>,
    /// Control-point indices per polygon, in winding order.
    pub polygons: Vec<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<MeshLayer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skins: Vec<Skin>,
}

impl Mesh {
    pub fn control_point_count(&self) -> usize {
        self.control_points.len()
    }

    pub fn polygon_vertex_count(&self) -> usize {
        self.polygons.iter().map(Vec::len).sum()
    }

    /// The first skin deformer, the one that is converted.
    pub fn skin(&self) -> Option<&Skin> {
        self.skins.first()
    }

    /// Control-point index of every polygon vertex, polygon-major.
    pub fn polygon_vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.polygons.iter().flat_map(|p| p.iter().copied())
    }
}
