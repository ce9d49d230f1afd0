//! usdfbx reader core
//!
//! Converts a read-only source scene (FBX-style node tree with meshes, skins, joints,
//! cameras and animation curves) into time-sampled prims and properties on a
//! [`SceneSink`](usdfbx_api_core::SceneSink). One pass walks the tree, picks readers by
//! node kind and collects non-fatal problems as [`Diagnostics`].

pub mod config;
pub mod context;
pub mod convert;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod ids;
pub mod layers;
pub mod readers;
pub mod sampling;
pub mod skeleton;
pub mod skin;
pub mod source;
pub mod translator;

// Re-exports for consumers
pub use config::TranslateConfig;
pub use context::ReaderContext;
pub use convert::{map_channels, map_default, map_property, map_type, MappedValue};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use dispatch::{Dispatch, ReaderFn};
pub use error::{SceneError, TranslateError};
pub use ids::{AnimLayerId, NodeId};
pub use sampling::{FrameRange, TimeSamples};
pub use skeleton::JointHierarchy;
pub use skin::BindingData;
pub use source::{AttributeKind, NodeAttribute, SourceNode, SourceProperty, SourceScene};
pub use translator::{PassSettings, Translation, Translator};
pub use usdfbx_api_core::{Stage, Value, ValueTypeName};
