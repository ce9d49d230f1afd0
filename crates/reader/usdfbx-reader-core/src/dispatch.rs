//! Kind-keyed reader table.
//!
//! Every node first receives its prim metadata, then the readers registered for its
//! attribute kind run in order against one shared [`ReaderContext`]. Kinds with no
//! registered readers still get the metadata.

use hashbrown::HashMap;
use std::fmt;

use crate::context::ReaderContext;
use crate::readers::{
    read_camera, read_imageable, read_mesh, read_metadata, read_skeleton,
    read_skeleton_animation, read_transform, read_unknown, read_user_properties, ReaderResult,
};
use crate::source::AttributeKind;

pub type ReaderFn = fn(&mut ReaderContext<'_>) -> ReaderResult;

#[derive(Clone)]
pub struct Dispatch {
    table: HashMap<AttributeKind, Vec<ReaderFn>>,
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.table.iter().map(|(kind, readers)| (kind, readers.len())))
            .finish()
    }
}

impl Default for Dispatch {
    fn default() -> Self {
        let mut table: HashMap<AttributeKind, Vec<ReaderFn>> = HashMap::new();
        table.insert(
            AttributeKind::Null,
            vec![read_transform, read_imageable, read_user_properties],
        );
        table.insert(
            AttributeKind::Mesh,
            vec![read_transform, read_imageable, read_mesh, read_user_properties],
        );
        table.insert(
            AttributeKind::Skeleton,
            vec![read_skeleton, read_skeleton_animation, read_imageable],
        );
        table.insert(
            AttributeKind::Camera,
            vec![read_transform, read_imageable, read_camera, read_user_properties],
        );
        table.insert(AttributeKind::Unknown, vec![read_unknown]);
        Self { table }
    }
}

impl Dispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty table; only metadata is authored until readers are registered.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Replace the reader list for `kind`.
    pub fn register(&mut self, kind: AttributeKind, readers: Vec<ReaderFn>) {
        self.table.insert(kind, readers);
    }

    pub fn readers(&self, kind: AttributeKind) -> &[ReaderFn] {
        self.table.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Run metadata and then every reader for the node's kind. A failing reader is
    /// reported and the next one still runs.
    pub fn run(&self, ctx: &mut ReaderContext<'_>) {
        let kind = ctx.node.kind();
        let readers = std::iter::once(read_metadata as ReaderFn)
            .chain(self.readers(kind).iter().copied());
        for reader in readers {
            if let Err(err) = reader(ctx) {
                ctx.warn(None, format!("reader failed for {kind:?} node: {err}"));
            }
        }
    }
}
