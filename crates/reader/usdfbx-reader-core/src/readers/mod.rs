//! Node readers. Each one authors one aspect of a node into the sink through its
//! [`ReaderContext`]; the dispatch table decides which run, and in which order.

mod camera;
mod mesh;
mod skeleton;

pub use camera::read_camera;
pub use mesh::read_mesh;
pub use skeleton::{read_skeleton, read_skeleton_animation};

use usdfbx_api_core::tokens::{self, display_group, field, prim_type};
use usdfbx_api_core::{PathError, Property, Value, ValueTypeName};

use crate::context::ReaderContext;
use crate::convert::{map_property, user_property_name};
use crate::source::{names, RotationOrder};

pub type ReaderResult = Result<(), PathError>;

/// `invisible` for a visibility at or below zero, `inherited` otherwise.
pub fn visibility_token(visibility: f64) -> &'static str {
    if visibility.abs() <= 1e-6 || visibility < 0.0 {
        tokens::INVISIBLE
    } else {
        tokens::INHERITED
    }
}

pub(crate) fn set_metadata(prop: &mut Property, key: &str, value: Value) {
    prop.metadata.insert(key.to_string(), value);
}

pub(crate) fn set_interpolation(prop: &mut Property, interpolation: &str) {
    set_metadata(prop, field::INTERPOLATION, Value::token(interpolation));
}

/// Prim metadata every converted node receives.
pub fn read_metadata(ctx: &mut ReaderContext<'_>) -> ReaderResult {
    let comment = format!("Converted from \"{}\"", ctx.node.name);
    let prim = ctx.prim();
    prim.metadata
        .insert(field::ACTIVE.to_string(), Value::Bool(true));
    prim.metadata
        .insert(field::HIDDEN.to_string(), Value::Bool(false));
    prim.metadata
        .insert(field::COMMENT.to_string(), Value::String(comment));
    Ok(())
}

pub fn read_unknown(ctx: &mut ReaderContext<'_>) -> ReaderResult {
    log::debug!("read_unknown for \"{}\"", ctx.node.name);
    ctx.prim().type_name = prim_type::SCOPE.to_string();
    Ok(())
}

pub fn read_imageable(ctx: &mut ReaderContext<'_>) -> ReaderResult {
    log::debug!("read_imageable for \"{}\"", ctx.node.name);
    let node = ctx.node;
    let layer = ctx.layer;
    let visibility = node.evaluate_scalar(names::VISIBILITY, layer, 0.0);
    ctx.create_property_with(
        "visibility",
        ValueTypeName::Token,
        Value::token(visibility_token(visibility)),
        display_group::IMAGEABLE,
        |t| Value::token(visibility_token(node.evaluate_scalar(names::VISIBILITY, layer, t))),
    )?;
    ctx.create_uniform_property(
        "purpose",
        ValueTypeName::Token,
        Value::token(tokens::DEFAULT),
        display_group::IMAGEABLE,
    )?;
    if ctx.config.author_generated_properties {
        let source = node.property(names::VISIBILITY);
        let stored = node.evaluate_scalar(names::VISIBILITY, None, 0.0);
        ctx.create_property(
            "generated:visibility",
            ValueTypeName::Double,
            Value::Double(stored),
            source,
            display_group::GENERATED,
        )?
        .custom = true;
    }
    Ok(())
}

pub fn read_user_properties(ctx: &mut ReaderContext<'_>) -> ReaderResult {
    log::debug!("read_user_properties for \"{}\"", ctx.node.name);
    let node = ctx.node;
    for source in node.user_properties() {
        let mapped = map_property(source);
        ctx.create_property(
            &user_property_name(&source.name),
            mapped.type_name,
            mapped.value,
            Some(source),
            display_group::USER,
        )?
        .custom = true;
    }
    Ok(())
}

fn rotate_op(ctx: &mut ReaderContext<'_>) -> String {
    let order = ctx.node.rotation_order;
    if order == RotationOrder::SphericXYZ {
        ctx.warn(
            None,
            "SphericXYZ rotation order is not supported; XYZ is used instead",
        );
    }
    format!("xformOp:rotate{}", order.axes())
}

pub fn read_transform(ctx: &mut ReaderContext<'_>) -> ReaderResult {
    log::debug!("read_transform for \"{}\"", ctx.node.name);
    ctx.prim().type_name = prim_type::XFORM.to_string();

    let node = ctx.node;
    let rotate = rotate_op(ctx);
    let translate = "xformOp:translate".to_string();
    let pivot = "xformOp:translate:pivot".to_string();
    let scale = "xformOp:scale".to_string();
    let pivot_inverse = format!("{}{pivot}", tokens::INVERT_PREFIX);

    let ops = [
        (&translate, names::LCL_TRANSLATION, ValueTypeName::Double3),
        (&pivot, names::ROTATION_PIVOT, ValueTypeName::Double3),
        (&rotate, names::LCL_ROTATION, ValueTypeName::Float3),
        (&scale, names::LCL_SCALING, ValueTypeName::Float3),
    ];
    for (op, source_name, type_name) in ops {
        let stored = node.evaluate_vec3(source_name, None, 0.0);
        ctx.create_property(
            op,
            type_name,
            Value::Double3(stored),
            node.property(source_name),
            display_group::XFORMABLE,
        )?;
    }

    ctx.create_uniform_property(
        "xformOpOrder",
        ValueTypeName::TokenArray,
        Value::tokens([translate, pivot, rotate, scale, pivot_inverse]),
        display_group::XFORMABLE,
    )?;
    Ok(())
}
