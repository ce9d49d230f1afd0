//! usdfbx-api-core: target-side scene description vocabulary (values, type names, paths,
//! prims, properties and the sink they are authored into).

pub mod coercion;
pub mod json;
pub mod path;
pub mod stage;
pub mod tokens;
pub mod value;
pub mod value_type;

pub use json::JsonError;
pub use path::{clean_name, PathError, ScenePath};
pub use stage::{Metadata, Prim, Property, SceneSink, Stage};
pub use value::{Matrix4, Value, ValueKind, IDENTITY_MATRIX};
pub use value_type::{ValueTypeName, Variability};
