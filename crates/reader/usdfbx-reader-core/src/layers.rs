//! Layered mesh attribute resolution.
//!
//! Positions are generated polygon-major (face-varying) or by control point. Among the
//! layers carrying one semantic, the first element that qualifies for it is used; later
//! ones are ignored. Nothing here fails: a missing layer gives an empty sequence and an
//! out-of-range index gives the element's zero value plus a miss.

use glam::DVec3;
use usdfbx_api_core::clean_name;

use crate::source::transform::geometric_transform;
use crate::source::{LayerElement, MappingMode, Mesh, ReferenceMode, SourceNode};

/// Values resolved for every position, and how many positions missed their element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resolved<T> {
    pub values: Vec<T>,
    pub misses: usize,
}

impl<T> Resolved<T> {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Resolved<U> {
        Resolved {
            values: self.values.into_iter().map(f).collect(),
            misses: self.misses,
        }
    }
}

/// Value of `element` at `position`, following its reference mode.
pub fn resolve<T: Copy>(element: &LayerElement<T>, position: usize) -> Option<T> {
    match element.reference {
        ReferenceMode::Direct => element.direct.get(position).copied(),
        ReferenceMode::Index | ReferenceMode::IndexToDirect => element
            .index
            .get(position)
            .and_then(|i| element.direct.get(*i))
            .copied(),
    }
}

fn collect<T, I>(element: &LayerElement<T>, positions: I) -> Resolved<T>
where
    T: Copy + Default,
    I: IntoIterator<Item = usize>,
{
    let mut out = Resolved {
        values: Vec::new(),
        misses: 0,
    };
    for position in positions {
        match resolve(element, position) {
            Some(v) => out.values.push(v),
            None => {
                out.misses += 1;
                out.values.push(T::default());
            }
        }
    }
    out
}

/// One value per polygon vertex, keyed by running polygon-vertex position.
pub fn face_varying<T: Copy + Default>(element: &LayerElement<T>, mesh: &Mesh) -> Resolved<T> {
    collect(element, 0..mesh.polygon_vertex_count())
}

/// One value per control point.
pub fn per_control_point<T: Copy + Default>(
    element: &LayerElement<T>,
    mesh: &Mesh,
) -> Resolved<T> {
    collect(element, 0..mesh.control_point_count())
}

/// One value per polygon vertex, keyed by that vertex's control point.
pub fn control_point_per_vertex<T: Copy + Default>(
    element: &LayerElement<T>,
    mesh: &Mesh,
) -> Resolved<T> {
    collect(element, mesh.polygon_vertices())
}

fn is_face_varying<T>(element: &LayerElement<T>) -> bool {
    element.mapping == MappingMode::ByPolygonVertex && element.reference != ReferenceMode::Index
}

fn f32x3(v: [f64; 3]) -> [f32; 3] {
    [v[0] as f32, v[1] as f32, v[2] as f32]
}

/// Face-varying normals. Without a per-polygon-vertex layer, the first per-control-point
/// normal layer is expanded to polygon vertices instead.
pub fn normals(mesh: &Mesh) -> Resolved<[f32; 3]> {
    let elements = || mesh.layers.iter().filter_map(|l| l.normals.as_ref());
    if let Some(element) = elements().find(|e| is_face_varying(e)) {
        return face_varying(element, mesh).map(f32x3);
    }
    match elements().find(|e| e.mapping == MappingMode::ByControlPoint) {
        Some(element) => control_point_per_vertex(element, mesh).map(f32x3),
        None => Resolved::default(),
    }
}

/// Face-varying tangents; empty without a qualifying layer.
pub fn tangents(mesh: &Mesh) -> Resolved<[f32; 3]> {
    mesh.layers
        .iter()
        .filter_map(|l| l.tangents.as_ref())
        .find(|e| is_face_varying(e))
        .map(|e| face_varying(e, mesh).map(f32x3))
        .unwrap_or_default()
}

/// Whether any layer carries a vertex-color element, qualifying or not.
pub fn has_vertex_colors(mesh: &Mesh) -> bool {
    mesh.layers.iter().any(|l| l.vertex_colors.is_some())
}

/// Per-control-point RGB colors.
///
/// An element qualifies when it is mapped by control point or uses the legacy `Index`
/// reference; its direct array is read by control point either way.
pub fn vertex_colors(mesh: &Mesh) -> Resolved<[f32; 3]> {
    let Some(element) = mesh
        .layers
        .iter()
        .filter_map(|l| l.vertex_colors.as_ref())
        .find(|e| e.mapping == MappingMode::ByControlPoint || e.reference == ReferenceMode::Index)
    else {
        return Resolved::default();
    };
    let mut out = Resolved::default();
    for cp in 0..mesh.control_point_count() {
        let rgba = element.direct.get(cp).copied().unwrap_or_else(|| {
            out.misses += 1;
            [0.0; 4]
        });
        out.values.push([rgba[0] as f32, rgba[1] as f32, rgba[2] as f32]);
    }
    out
}

/// A named texture-coordinate set.
#[derive(Clone, Debug, PartialEq)]
pub struct UvSet {
    /// Property name, `primvars:st` or `primvars:st_<layer name>`.
    pub name: String,
    pub coords: Resolved<[f32; 2]>,
}

/// One set per layer whose UV element is face-varying. Names carry the element's name as a
/// suffix whenever the mesh has more than one layer.
pub fn uv_sets(mesh: &Mesh) -> Vec<UvSet> {
    let suffixed = mesh.layers.len() > 1;
    mesh.layers
        .iter()
        .filter_map(|l| l.uvs.as_ref())
        .filter(|e| is_face_varying(e))
        .map(|e| UvSet {
            name: if suffixed {
                format!("primvars:st_{}", clean_name(&e.name))
            } else {
                "primvars:st".to_string()
            },
            coords: face_varying(e, mesh).map(|uv| [uv[0] as f32, uv[1] as f32]),
        })
        .collect()
}

/// Control points with the node's geometric offset applied.
pub fn points(node: &SourceNode, mesh: &Mesh) -> Vec<[f32; 3]> {
    let geometry = geometric_transform(node);
    mesh.control_points
        .iter()
        .map(|p| f32x3(geometry.transform_point3(DVec3::from_array(*p)).to_array()))
        .collect()
}

pub fn face_vertex_counts(mesh: &Mesh) -> Vec<i32> {
    mesh.polygons.iter().map(|p| p.len() as i32).collect()
}

pub fn face_vertex_indices(mesh: &Mesh) -> Vec<i32> {
    mesh.polygon_vertices().map(|i| i as i32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MeshLayer, NodeAttribute};

    fn quad_and_triangle() -> Mesh {
        Mesh {
            control_points: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [2.0, 0.0, 0.0],
            ],
            polygons: vec![vec![0, 1, 2, 3], vec![1, 4, 2]],
            ..Mesh::default()
        }
    }

    #[test]
    fn direct_and_indexed_resolve_identically() {
        let mesh = quad_and_triangle();
        let uvs: Vec<[f64; 2]> = (0..7).map(|i| [i as f64 * 0.1, 1.0]).collect();
        let direct = LayerElement::direct(MappingMode::ByPolygonVertex, uvs.clone());
        let mut pool = uvs.clone();
        pool.reverse();
        let index: Vec<usize> = (0..7).map(|i| 6 - i).collect();
        let indexed = LayerElement::indexed(MappingMode::ByPolygonVertex, pool, index);
        let a = face_varying(&direct, &mesh);
        let b = face_varying(&indexed, &mesh);
        assert_eq!(a, b);
        assert_eq!(a.values.len(), 7);
        assert_eq!(a.misses, 0);
    }

    #[test]
    fn out_of_range_reads_zero_and_counts() {
        let mesh = quad_and_triangle();
        let element =
            LayerElement::indexed(MappingMode::ByPolygonVertex, vec![[1.0, 1.0]], vec![0, 5]);
        let r = face_varying(&element, &mesh);
        assert_eq!(r.values.len(), 7);
        assert_eq!(r.values[0], [1.0, 1.0]);
        assert_eq!(r.values[1], [0.0, 0.0]);
        assert_eq!(r.misses, 6);
    }

    #[test]
    fn first_qualifying_layer_wins() {
        let mut mesh = quad_and_triangle();
        let legacy = LayerElement {
            reference: ReferenceMode::Index,
            ..LayerElement::direct(MappingMode::ByPolygonVertex, vec![[9.0, 9.0, 9.0]; 7])
        };
        mesh.layers = vec![
            MeshLayer {
                normals: Some(legacy),
                ..MeshLayer::default()
            },
            MeshLayer {
                normals: Some(LayerElement::direct(
                    MappingMode::ByPolygonVertex,
                    vec![[0.0, 0.0, 1.0]; 7],
                )),
                ..MeshLayer::default()
            },
            MeshLayer {
                normals: Some(LayerElement::direct(
                    MappingMode::ByPolygonVertex,
                    vec![[0.0, 1.0, 0.0]; 7],
                )),
                ..MeshLayer::default()
            },
        ];
        let n = normals(&mesh);
        assert_eq!(n.values, vec![[0.0, 0.0, 1.0]; 7]);
        assert!(tangents(&mesh).is_empty());
    }

    #[test]
    fn normals_fall_back_to_control_points() {
        let mut mesh = quad_and_triangle();
        let per_cp: Vec<[f64; 3]> = (0..5).map(|i| [i as f64, 0.0, 0.0]).collect();
        mesh.layers = vec![MeshLayer {
            normals: Some(LayerElement::direct(MappingMode::ByControlPoint, per_cp)),
            ..MeshLayer::default()
        }];
        let n = normals(&mesh);
        let xs: Vec<f32> = n.values.iter().map(|v| v[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 1.0, 4.0, 2.0]);
    }

    #[test]
    fn vertex_colors_read_by_control_point() {
        let mut mesh = quad_and_triangle();
        assert!(!has_vertex_colors(&mesh));
        mesh.layers = vec![MeshLayer {
            vertex_colors: Some(LayerElement::direct(
                MappingMode::ByPolygonVertex,
                vec![[1.0, 0.0, 0.0, 1.0]; 7],
            )),
            ..MeshLayer::default()
        }];
        assert!(has_vertex_colors(&mesh));
        assert!(vertex_colors(&mesh).is_empty());

        mesh.layers[0].vertex_colors = Some(LayerElement::direct(
            MappingMode::ByControlPoint,
            vec![[0.5, 0.25, 1.0, 1.0]; 3],
        ));
        let colors = vertex_colors(&mesh);
        assert_eq!(colors.values.len(), 5);
        assert_eq!(colors.values[0], [0.5, 0.25, 1.0]);
        assert_eq!(colors.misses, 2);
    }

    #[test]
    fn uv_sets_are_suffixed_with_several_layers() {
        let mut mesh = quad_and_triangle();
        let uv = |name: &str| {
            Some(LayerElement::direct(MappingMode::ByPolygonVertex, vec![[0.0, 0.0]; 7]).named(name))
        };
        mesh.layers = vec![MeshLayer {
            uvs: uv("map1"),
            ..MeshLayer::default()
        }];
        assert_eq!(uv_sets(&mesh)[0].name, "primvars:st");

        mesh.layers.push(MeshLayer {
            uvs: uv("detail"),
            ..MeshLayer::default()
        });
        mesh.layers.push(MeshLayer {
            uvs: Some(LayerElement::direct(MappingMode::ByControlPoint, vec![[0.0, 0.0]; 5])),
            ..MeshLayer::default()
        });
        let names: Vec<String> = uv_sets(&mesh).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["primvars:st_map1", "primvars:st_detail"]);
    }

    #[test]
    fn topology_and_geometric_offset() {
        let mesh = quad_and_triangle();
        assert_eq!(face_vertex_counts(&mesh), vec![4, 3]);
        assert_eq!(face_vertex_indices(&mesh), vec![0, 1, 2, 3, 1, 4, 2]);
        let mut node = SourceNode::new("M", NodeAttribute::Mesh(Box::new(mesh.clone())));
        node.geometric_translation = [0.0, 0.0, 5.0];
        let p = points(&node, &mesh);
        assert_eq!(p[4], [2.0, 0.0, 5.0]);
    }
}
