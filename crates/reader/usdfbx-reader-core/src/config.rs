//! Translation pass configuration.

use serde::{Deserialize, Serialize};

use crate::sampling::FrameRange;

/// Options for a translation pass. Every field has a default so partial JSON works.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Name of the top-level prim every node is authored under.
    pub root_prim_name: String,
    /// Inclusive frame range to sample; falls back to the scene timeline, then `[0, 0]`.
    pub frame_range: Option<FrameRange>,
    /// Animation layer to sample by name; falls back to the scene's first layer.
    pub anim_layer: Option<String>,
    /// Author the custom `generated:*` properties (visibility curve, field of view).
    pub author_generated_properties: bool,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            root_prim_name: "ROOT".to_string(),
            frame_range: None,
            anim_layer: None,
            author_generated_properties: true,
        }
    }
}
