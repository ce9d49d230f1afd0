//! Per-node authoring context shared by the readers of one node.

use usdfbx_api_core::coercion::coerce;
use usdfbx_api_core::tokens::field;
use usdfbx_api_core::{
    PathError, Prim, Property, SceneSink, ScenePath, Value, ValueTypeName, Variability,
};

use crate::config::TranslateConfig;
use crate::diagnostics::Diagnostics;
use crate::ids::{AnimLayerId, NodeId};
use crate::sampling::{sample_property, sample_with, FrameRange, TimeSamples};
use crate::source::{SourceNode, SourceProperty, SourceScene};

/// Everything a reader sees while converting one node.
///
/// The source scene is read-only; all authoring goes through the sink. Property creation
/// overwrites an existing property at the same path.
pub struct ReaderContext<'a> {
    pub scene: &'a SourceScene,
    pub id: NodeId,
    pub node: &'a SourceNode,
    /// Prim path of the node.
    pub path: ScenePath,
    /// The top-level prim every node is authored under.
    pub root_path: ScenePath,
    pub layer: Option<AnimLayerId>,
    pub range: FrameRange,
    /// Converts lengths authored in the original unit into the scene unit.
    pub scale_factor: f64,
    pub config: &'a TranslateConfig,
    pub diagnostics: &'a mut Diagnostics,
    sink: &'a mut dyn SceneSink,
}

impl<'a> ReaderContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scene: &'a SourceScene,
        id: NodeId,
        node: &'a SourceNode,
        path: ScenePath,
        root_path: ScenePath,
        layer: Option<AnimLayerId>,
        range: FrameRange,
        config: &'a TranslateConfig,
        sink: &'a mut dyn SceneSink,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            scene,
            id,
            node,
            path,
            root_path,
            layer,
            range,
            scale_factor: scene.settings.conversion_factor(),
            config,
            diagnostics,
            sink,
        }
    }

    /// The node's prim, created on first use.
    pub fn prim(&mut self) -> &mut Prim {
        self.sink.get_or_add_prim(&self.path)
    }

    pub fn get_or_add_prim(&mut self, path: &ScenePath) -> &mut Prim {
        self.sink.get_or_add_prim(path)
    }

    pub fn warn(&mut self, property: Option<&str>, message: impl Into<String>) {
        self.diagnostics.warn(Some(self.id), property, message);
    }

    /// Curve samples of `source` on the active layer, converted to `ty`.
    pub fn sample_curves(&self, source: &SourceProperty, ty: ValueTypeName) -> TimeSamples {
        sample_property(source, self.layer, self.range)
            .into_iter()
            .map(|(t, v)| (t, coerce(&v, ty).unwrap_or(v)))
            .collect()
    }

    /// `f` evaluated at every frame on the active layer.
    pub fn sample_fn<F>(&self, f: F) -> TimeSamples
    where
        F: FnMut(f64) -> Value,
    {
        sample_with(self.layer, self.range, f)
    }

    /// Author `path` with its type, default, samples and display group.
    pub fn author(
        &mut self,
        path: &ScenePath,
        type_name: ValueTypeName,
        variability: Variability,
        default: Value,
        samples: TimeSamples,
        display_group: &str,
    ) -> &mut Property {
        let default = coerce(&default, type_name).unwrap_or(default);
        let prop = self.sink.add_property(path, type_name, variability);
        prop.type_name = type_name;
        prop.variability = variability;
        prop.default = default;
        prop.time_samples = samples;
        prop.metadata.clear();
        prop.metadata.insert(
            field::DISPLAY_GROUP.to_string(),
            Value::String(display_group.to_string()),
        );
        prop
    }

    /// Varying property on the node's prim, sampled from `source`'s curves when given.
    pub fn create_property(
        &mut self,
        name: &str,
        type_name: ValueTypeName,
        default: Value,
        source: Option<&SourceProperty>,
        display_group: &str,
    ) -> Result<&mut Property, PathError> {
        let path = self.path.append_property(name)?;
        let samples = source
            .map(|s| self.sample_curves(s, type_name))
            .unwrap_or_default();
        Ok(self.author(
            &path,
            type_name,
            Variability::Varying,
            default,
            samples,
            display_group,
        ))
    }

    /// Varying property on the node's prim, sampled from `f` at every frame.
    pub fn create_property_with<F>(
        &mut self,
        name: &str,
        type_name: ValueTypeName,
        default: Value,
        display_group: &str,
        f: F,
    ) -> Result<&mut Property, PathError>
    where
        F: FnMut(f64) -> Value,
    {
        let path = self.path.append_property(name)?;
        let samples = self.sample_fn(f);
        Ok(self.author(
            &path,
            type_name,
            Variability::Varying,
            default,
            samples,
            display_group,
        ))
    }

    pub fn create_uniform_property(
        &mut self,
        name: &str,
        type_name: ValueTypeName,
        default: Value,
        display_group: &str,
    ) -> Result<&mut Property, PathError> {
        let path = self.path.append_property(name)?;
        Ok(self.author(
            &path,
            type_name,
            Variability::Uniform,
            default,
            Vec::new(),
            display_group,
        ))
    }

    /// Relationship at `from` (a property path) pointing at `to`.
    pub fn create_relationship_at(
        &mut self,
        from: &ScenePath,
        to: ScenePath,
        display_group: &str,
    ) -> &mut Property {
        let prop = self.author(
            from,
            ValueTypeName::Token,
            Variability::Uniform,
            Value::Empty,
            Vec::new(),
            display_group,
        );
        prop.add_target(to);
        prop
    }

    pub fn create_relationship(
        &mut self,
        name: &str,
        to: ScenePath,
        display_group: &str,
    ) -> Result<&mut Property, PathError> {
        let from = self.path.append_property(name)?;
        Ok(self.create_relationship_at(&from, to, display_group))
    }
}
