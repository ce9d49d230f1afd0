//! Well-known names used when authoring into a stage.

/// Metadata keys.
pub mod field {
    pub const ACTIVE: &str = "active";
    pub const HIDDEN: &str = "hidden";
    pub const COMMENT: &str = "comment";
    pub const DISPLAY_GROUP: &str = "displayGroup";
    pub const INTERPOLATION: &str = "interpolation";
    pub const ELEMENT_SIZE: &str = "elementSize";
    pub const API_SCHEMAS: &str = "apiSchemas";
}

/// Values of the `displayGroup` metadata entry.
pub mod display_group {
    pub const XFORMABLE: &str = "Xformable";
    pub const IMAGEABLE: &str = "Imageable";
    pub const CAMERA: &str = "Camera";
    pub const MESH: &str = "Mesh";
    pub const PRIMVARS: &str = "Primvars";
    pub const SKELETON: &str = "Skeleton";
    pub const SKEL_ANIMATION: &str = "SkelAnimation";
    pub const SKEL_BINDING: &str = "SkelBindingAPI";
    pub const USER: &str = "User";
    pub const GENERATED: &str = "Generated";
}

/// Prim schema type names.
pub mod prim_type {
    pub const XFORM: &str = "Xform";
    pub const SCOPE: &str = "Scope";
    pub const MESH: &str = "Mesh";
    pub const CAMERA: &str = "Camera";
    pub const SKELETON: &str = "Skeleton";
    pub const SKEL_ANIMATION: &str = "SkelAnimation";
}

/// Interpolation metadata values.
pub mod interpolation {
    pub const CONSTANT: &str = "constant";
    pub const UNIFORM: &str = "uniform";
    pub const VERTEX: &str = "vertex";
    pub const FACE_VARYING: &str = "faceVarying";
}

pub const SKEL_BINDING_API: &str = "SkelBindingAPI";

pub const INHERITED: &str = "inherited";
pub const INVISIBLE: &str = "invisible";
pub const DEFAULT: &str = "default";
pub const RIGHT_HANDED: &str = "rightHanded";
pub const NONE: &str = "none";
pub const PERSPECTIVE: &str = "perspective";
pub const ORTHOGRAPHIC: &str = "orthographic";
pub const INVERT_PREFIX: &str = "!invert!";
