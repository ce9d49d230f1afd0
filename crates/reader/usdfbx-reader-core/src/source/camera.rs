use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

/// Static camera attribute data. Animatable lens values (focal length, focus distance,
/// field of view) live on the node as properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub projection: Projection,
    /// Film back width in inches.
    pub film_width: f64,
    /// Film back height in inches.
    pub film_height: f64,
    pub squeeze_ratio: f64,
    pub near_plane: f64,
    pub far_plane: f64,
    pub use_depth_of_field: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective,
            film_width: 0.816,
            film_height: 0.612,
            squeeze_ratio: 1.0,
            near_plane: 10.0,
            far_plane: 4000.0,
            use_depth_of_field: false,
        }
    }
}
