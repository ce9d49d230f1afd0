//! Errors raised before a translation pass starts.
//!
//! Anything that goes wrong while a node is converted is reported through
//! [`Diagnostics`](crate::diagnostics::Diagnostics) instead; a failing reader does not
//! stop the pass.

use thiserror::Error;
use usdfbx_api_core::PathError;

use crate::ids::NodeId;

/// Structural problems in a source scene.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene has no root node")]
    MissingRoot,
    #[error("root node must not have a parent")]
    RootHasParent,
    #[error("node {0} has no parent")]
    Orphan(NodeId),
    #[error("node {node} references missing node {missing}")]
    DanglingReference { node: NodeId, missing: NodeId },
    #[error("node {0} is not reachable from the root")]
    Unreachable(NodeId),
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("animation layer '{0}' not found in scene")]
    UnknownAnimLayer(String),
    #[error("node {0} does not exist")]
    DanglingNode(NodeId),
    #[error("invalid root prim name: {0}")]
    Path(#[from] PathError),
}
