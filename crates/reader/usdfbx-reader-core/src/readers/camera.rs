use usdfbx_api_core::tokens::{self, display_group, prim_type};
use usdfbx_api_core::{Value, ValueTypeName};

use super::ReaderResult;
use crate::context::ReaderContext;
use crate::source::{names, Projection};

const MM_PER_INCH: f64 = 25.4;

pub fn read_camera(ctx: &mut ReaderContext<'_>) -> ReaderResult {
    log::debug!("read_camera for \"{}\"", ctx.node.name);
    ctx.prim().type_name = prim_type::CAMERA.to_string();
    let node = ctx.node;
    let Some(camera) = node.camera() else {
        return Ok(());
    };
    let scene = ctx.scene;
    let settings = &scene.settings;
    let layer = ctx.layer;

    let focal_length = |t: f64| {
        settings.to_tenths_of_scene_unit(node.evaluate_scalar(names::FOCAL_LENGTH, layer, t))
    };
    ctx.create_property_with(
        "focalLength",
        ValueTypeName::Float,
        Value::Float(focal_length(0.0) as f32),
        display_group::CAMERA,
        |t| Value::Float(focal_length(t) as f32),
    )?;

    ctx.create_property(
        "focusDistance",
        ValueTypeName::Float,
        Value::Double(node.evaluate_scalar(names::FOCUS_DISTANCE, None, 0.0)),
        node.property(names::FOCUS_DISTANCE),
        display_group::CAMERA,
    )?;

    let aperture = |inches: f64| {
        settings.to_tenths_of_scene_unit(inches * camera.squeeze_ratio * MM_PER_INCH) as f32
    };
    ctx.create_property(
        "horizontalAperture",
        ValueTypeName::Float,
        Value::Float(aperture(camera.film_width)),
        None,
        display_group::CAMERA,
    )?;
    ctx.create_property(
        "verticalAperture",
        ValueTypeName::Float,
        Value::Float(aperture(camera.film_height)),
        None,
        display_group::CAMERA,
    )?;

    let projection = match camera.projection {
        Projection::Perspective => tokens::PERSPECTIVE,
        Projection::Orthographic => tokens::ORTHOGRAPHIC,
    };
    ctx.create_property(
        "projection",
        ValueTypeName::Token,
        Value::token(projection),
        None,
        display_group::CAMERA,
    )?;

    // The source has no f-stop; depth of field is signalled with zero.
    if camera.use_depth_of_field {
        ctx.create_property(
            "fStop",
            ValueTypeName::Float,
            Value::Float(0.0),
            None,
            display_group::CAMERA,
        )?;
    }

    ctx.create_property(
        "clippingRange",
        ValueTypeName::Float2,
        Value::Float2([camera.near_plane as f32, camera.far_plane as f32]),
        None,
        display_group::CAMERA,
    )?;

    if ctx.config.author_generated_properties {
        let fov = |t: f64| node.evaluate_scalar(names::FIELD_OF_VIEW, layer, t) as f32;
        ctx.create_property_with(
            "generated:fov",
            ValueTypeName::Float,
            Value::Float(fov(0.0)),
            display_group::GENERATED,
            |t| Value::Float(fov(t)),
        )?
        .custom = true;
    }
    Ok(())
}
