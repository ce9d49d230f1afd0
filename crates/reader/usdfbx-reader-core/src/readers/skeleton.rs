use std::collections::BTreeMap;

use half::f16;
use indexmap::IndexMap;
use usdfbx_api_core::tokens::{display_group, prim_type};
use usdfbx_api_core::{clean_name, Value, ValueTypeName, Variability};

use super::ReaderResult;
use crate::context::ReaderContext;
use crate::convert::{map_property, user_property_name};
use crate::ids::NodeId;
use crate::sampling::{is_constant, sample_property, TimeSamples};
use crate::skeleton::{JointHierarchy, Space};
use crate::source::{names, SourceProperty};

/// Only the topmost joint of a chain is converted; nested joints are covered by it.
fn is_topmost_joint(ctx: &ReaderContext<'_>) -> bool {
    ctx.node.is_skeleton()
        && !ctx
            .scene
            .parent(ctx.id)
            .is_some_and(|p| ctx.scene.is_skeleton(p))
}

fn collect_hierarchy(ctx: &mut ReaderContext<'_>, warn: bool) -> JointHierarchy {
    let hierarchy = JointHierarchy::collect(ctx.scene, ctx.id);
    if warn {
        for excluded in &hierarchy.excluded {
            ctx.diagnostics.warn(
                Some(*excluded),
                None,
                format!(
                    "\"{}\" is not a joint but is part of the skeleton hierarchy of \"{}\"; it and its children are ignored",
                    ctx.scene.name(*excluded),
                    ctx.node.name
                ),
            );
        }
    }
    hierarchy
}

pub fn read_skeleton(ctx: &mut ReaderContext<'_>) -> ReaderResult {
    log::debug!("read_skeleton for \"{}\"", ctx.node.name);
    if !is_topmost_joint(ctx) {
        return Ok(());
    }
    ctx.prim().type_name = prim_type::SKELETON.to_string();

    let hierarchy = collect_hierarchy(ctx, true);
    let scene = ctx.scene;
    let rest = hierarchy.matrices(scene, Space::Local, None, 0.0, ctx.scale_factor);
    let bind = hierarchy.matrices(scene, Space::World, None, 0.0, 1.0);

    ctx.create_uniform_property(
        "joints",
        ValueTypeName::TokenArray,
        Value::TokenArray(hierarchy.tokens(scene)),
        display_group::SKELETON,
    )?;
    ctx.create_uniform_property(
        "restTransforms",
        ValueTypeName::Matrix4dArray,
        Value::Matrix4dArray(rest),
        display_group::SKELETON,
    )?;
    ctx.create_uniform_property(
        "bindTransforms",
        ValueTypeName::Matrix4dArray,
        Value::Matrix4dArray(bind),
        display_group::SKELETON,
    )?;
    Ok(())
}

/// Per-joint values of one animated property, merged across the hierarchy.
struct Aggregate {
    type_name: ValueTypeName,
    defaults: Vec<Value>,
    owners: Vec<String>,
    samples: BTreeMap<i64, Vec<Value>>,
}

/// Pack per-joint values into the array representation of `ty`.
fn pack(ty: ValueTypeName, values: Vec<Value>) -> Value {
    let all = |f: fn(&Value) -> bool| values.iter().all(f);
    match ty {
        ValueTypeName::FloatArray if all(|v| matches!(v, Value::Float(_))) => Value::FloatArray(
            values
                .into_iter()
                .filter_map(|v| match v {
                    Value::Float(f) => Some(f),
                    _ => None,
                })
                .collect(),
        ),
        ValueTypeName::IntArray if all(|v| matches!(v, Value::Int(_))) => Value::IntArray(
            values
                .into_iter()
                .filter_map(|v| match v {
                    Value::Int(i) => Some(i),
                    _ => None,
                })
                .collect(),
        ),
        ValueTypeName::TokenArray if all(|v| matches!(v, Value::Token(_))) => Value::TokenArray(
            values
                .into_iter()
                .filter_map(|v| match v {
                    Value::Token(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => Value::Array(values),
    }
}

fn animated_properties<'n>(
    ctx: &ReaderContext<'n>,
    joint: NodeId,
) -> Vec<&'n SourceProperty> {
    let (Some(layer), Some(node)) = (ctx.layer, ctx.scene.node(joint)) else {
        return Vec::new();
    };
    let mut props: Vec<&'n SourceProperty> = node
        .user_properties()
        .filter(|p| p.is_animated(layer))
        .collect();
    if let Some(visibility) = node.property(names::VISIBILITY) {
        if visibility.is_animated(layer) && !visibility.user_defined {
            props.push(visibility);
        }
    }
    props
}

pub fn read_skeleton_animation(ctx: &mut ReaderContext<'_>) -> ReaderResult {
    log::debug!("read_skeleton_animation for \"{}\"", ctx.node.name);
    if !is_topmost_joint(ctx) {
        return Ok(());
    }
    let Some(layer) = ctx.layer else {
        return Ok(());
    };
    let Some(parent_path) = ctx.path.parent_path() else {
        ctx.warn(None, format!("no parent prim for {}", ctx.path));
        return Ok(());
    };
    let anim_name = format!("Animation{}", clean_name(&ctx.node.name));
    let anim_path = parent_path.append_child(&anim_name)?;
    ctx.get_or_add_prim(&anim_path).type_name = prim_type::SKEL_ANIMATION.to_string();

    let hierarchy = collect_hierarchy(ctx, false);
    let scene = ctx.scene;
    let tokens = hierarchy.tokens(scene);

    let mut aggregates: IndexMap<String, Aggregate> = IndexMap::new();
    for (joint, token) in hierarchy.joints.iter().zip(&tokens) {
        for source in animated_properties(ctx, *joint) {
            let mapped = map_property(source);
            let entry = aggregates
                .entry(user_property_name(&source.name))
                .or_insert_with(|| Aggregate {
                    type_name: mapped.type_name.array_type(),
                    defaults: Vec::new(),
                    owners: Vec::new(),
                    samples: BTreeMap::new(),
                });
            for (t, v) in sample_property(source, Some(layer), ctx.range) {
                entry.samples.entry(t as i64).or_default().push(v);
            }
            entry.defaults.push(mapped.value);
            entry.owners.push(token.clone());
        }
    }

    let mut translations: TimeSamples = Vec::with_capacity(ctx.range.len());
    let mut rotations: TimeSamples = Vec::with_capacity(ctx.range.len());
    let mut scales: TimeSamples = Vec::with_capacity(ctx.range.len());
    for frame in ctx.range.frames() {
        let t = frame as f64;
        let mut ts = Vec::with_capacity(hierarchy.len());
        let mut rs = Vec::with_capacity(hierarchy.len());
        for joint in &hierarchy.joints {
            let (_, rotation, translation) = scene
                .local_transform(*joint, Some(layer), t)
                .to_scale_rotation_translation();
            ts.push(translation.as_vec3().to_array());
            rs.push(rotation.as_quat().to_array());
        }
        let ones = [f16::ONE; 3];
        translations.push((t, Value::Float3Array(ts)));
        rotations.push((t, Value::QuatfArray(rs)));
        scales.push((t, Value::Half3Array(vec![ones; hierarchy.len()])));
    }

    ctx.author(
        &anim_path.append_property("joints")?,
        ValueTypeName::TokenArray,
        Variability::Uniform,
        Value::TokenArray(tokens),
        Vec::new(),
        display_group::SKEL_ANIMATION,
    );

    let first = |samples: &TimeSamples| {
        samples
            .first()
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };
    let translations_default = first(&translations);
    ctx.author(
        &anim_path.append_property("translations")?,
        ValueTypeName::Float3Array,
        Variability::Varying,
        translations_default,
        translations,
        display_group::SKEL_ANIMATION,
    );
    let rotations_default = first(&rotations);
    ctx.author(
        &anim_path.append_property("rotations")?,
        ValueTypeName::QuatfArray,
        Variability::Varying,
        rotations_default,
        rotations,
        display_group::SKEL_ANIMATION,
    );
    let scales_default = first(&scales);
    let scales = if is_constant(&scales) { Vec::new() } else { scales };
    ctx.author(
        &anim_path.append_property("scales")?,
        ValueTypeName::Half3Array,
        Variability::Varying,
        scales_default,
        scales,
        display_group::SKEL_ANIMATION,
    );

    for (name, aggregate) in aggregates {
        let Aggregate {
            type_name,
            defaults,
            owners,
            samples,
        } = aggregate;
        let samples: TimeSamples = samples
            .into_iter()
            .map(|(frame, values)| (frame as f64, pack(type_name, values)))
            .collect();
        ctx.author(
            &anim_path.append_property(&name)?,
            type_name,
            Variability::Varying,
            pack(type_name, defaults),
            samples,
            display_group::USER,
        )
        .custom = true;
        ctx.author(
            &anim_path.append_property(&format!("{name}:owner"))?,
            ValueTypeName::TokenArray,
            Variability::Uniform,
            Value::TokenArray(owners),
            Vec::new(),
            display_group::USER,
        )
        .custom = true;
    }

    let skeleton_path = ctx.path.clone();
    ctx.create_relationship_at(
        &skeleton_path.append_property("skel:animationSource")?,
        anim_path,
        display_group::SKEL_ANIMATION,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_uses_typed_arrays_when_uniform() {
        assert_eq!(
            pack(
                ValueTypeName::FloatArray,
                vec![Value::Float(1.0), Value::Float(2.0)]
            ),
            Value::FloatArray(vec![1.0, 2.0])
        );
        assert_eq!(
            pack(
                ValueTypeName::DoubleArray,
                vec![Value::Double(1.0), Value::Double(2.0)]
            ),
            Value::Array(vec![Value::Double(1.0), Value::Double(2.0)])
        );
        assert_eq!(
            pack(ValueTypeName::IntArray, vec![Value::Int(1), Value::Float(2.0)]),
            Value::Array(vec![Value::Int(1), Value::Float(2.0)])
        );
    }
}
