//! The translation pass: resolves what to sample, walks the source tree and runs the
//! reader dispatch for every node.

use hashbrown::HashSet;
use usdfbx_api_core::tokens::prim_type;
use usdfbx_api_core::{clean_name, SceneSink, ScenePath, Stage};

use crate::config::TranslateConfig;
use crate::context::ReaderContext;
use crate::diagnostics::Diagnostics;
use crate::dispatch::Dispatch;
use crate::error::TranslateError;
use crate::ids::{AnimLayerId, NodeId};
use crate::sampling::FrameRange;
use crate::source::SourceScene;

/// What a pass samples and where it authors, resolved once per scene.
#[derive(Clone, Debug, PartialEq)]
pub struct PassSettings {
    pub root_path: ScenePath,
    pub layer: Option<AnimLayerId>,
    pub range: FrameRange,
}

/// Result of [`Translator::translate`].
#[derive(Debug)]
pub struct Translation {
    pub stage: Stage,
    pub diagnostics: Diagnostics,
}

#[derive(Clone, Debug, Default)]
pub struct Translator {
    config: TranslateConfig,
    dispatch: Dispatch,
}

impl Translator {
    pub fn new(config: TranslateConfig) -> Self {
        Self {
            config,
            dispatch: Dispatch::new(),
        }
    }

    pub fn with_dispatch(config: TranslateConfig, dispatch: Dispatch) -> Self {
        Self { config, dispatch }
    }

    pub fn config(&self) -> &TranslateConfig {
        &self.config
    }

    /// Resolve the root prim, animation layer and frame range for `scene`.
    pub fn prepare(&self, scene: &SourceScene) -> Result<PassSettings, TranslateError> {
        let root_path = ScenePath::absolute_root().append_child(&self.config.root_prim_name)?;
        let layer = match &self.config.anim_layer {
            Some(name) => Some(
                scene
                    .anim_layer_by_name(name)
                    .ok_or_else(|| TranslateError::UnknownAnimLayer(name.clone()))?,
            ),
            None if scene.anim_layers.is_empty() => None,
            None => Some(AnimLayerId(0)),
        };
        let range = self
            .config
            .frame_range
            .or(scene.settings.timeline)
            .unwrap_or_default();
        Ok(PassSettings {
            root_path,
            layer,
            range,
        })
    }

    /// Translate `scene` into a fresh [`Stage`].
    pub fn translate(&self, scene: &SourceScene) -> Result<Translation, TranslateError> {
        let mut stage = Stage::new();
        let diagnostics = self.translate_into(scene, &mut stage)?;
        Ok(Translation { stage, diagnostics })
    }

    /// Translate `scene` into a caller-supplied sink.
    pub fn translate_into(
        &self,
        scene: &SourceScene,
        sink: &mut dyn SceneSink,
    ) -> Result<Diagnostics, TranslateError> {
        let pass = self.prepare(scene)?;
        let mut diagnostics = Diagnostics::new();
        log::debug!(
            "translating {} nodes under {} (layer {:?}, frames {}..={})",
            scene.node_count(),
            pass.root_path,
            pass.layer,
            pass.range.start,
            pass.range.end
        );
        if pass.layer.is_none() {
            diagnostics.info(None, "scene has no animation layers; only defaults are authored");
        }
        sink.get_or_add_prim(&pass.root_path).type_name = prim_type::XFORM.to_string();

        let mut used: HashSet<ScenePath> = HashSet::new();
        let mut stack: Vec<(NodeId, ScenePath)> = scene
            .children(scene.root())
            .iter()
            .rev()
            .map(|c| (*c, pass.root_path.clone()))
            .collect();
        while let Some((id, parent_path)) = stack.pop() {
            let path = parent_path.append_child(&clean_name(scene.name(id)))?;
            if !used.insert(path.clone()) {
                diagnostics.warn(
                    Some(id),
                    None,
                    format!("{path} is shared with a sibling; their properties are merged"),
                );
            }
            self.translate_node(scene, &pass, id, path.clone(), sink, &mut diagnostics)?;
            // Joint chains are covered by their skeleton.
            if scene.is_skeleton(id) {
                continue;
            }
            stack.extend(
                scene
                    .children(id)
                    .iter()
                    .rev()
                    .map(|c| (*c, path.clone())),
            );
        }
        Ok(diagnostics)
    }

    /// Run the dispatch for one node at `path`.
    pub fn translate_node(
        &self,
        scene: &SourceScene,
        pass: &PassSettings,
        id: NodeId,
        path: ScenePath,
        sink: &mut dyn SceneSink,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), TranslateError> {
        let node = scene.node(id).ok_or(TranslateError::DanglingNode(id))?;
        let mut ctx = ReaderContext::new(
            scene,
            id,
            node,
            path,
            pass.root_path.clone(),
            pass.layer,
            pass.range,
            &self.config,
            sink,
            diagnostics,
        );
        self.dispatch.run(&mut ctx);
        Ok(())
    }
}
