use usdfbx_api_core::tokens::{self, display_group, field, interpolation, prim_type};
use usdfbx_api_core::{Value, ValueTypeName};

use super::{set_interpolation, set_metadata, ReaderResult};
use crate::context::ReaderContext;
use crate::layers::{self, Resolved};
use crate::skin;
use crate::source::Skin;
use crate::source::transform::{to_matrix4, without_scale};

fn report_misses<T>(ctx: &mut ReaderContext<'_>, property: &str, resolved: &Resolved<T>) {
    if resolved.misses > 0 {
        ctx.warn(
            Some(property),
            format!(
                "{} of {} values could not be resolved and were zeroed",
                resolved.misses,
                resolved.values.len()
            ),
        );
    }
}

pub fn read_mesh(ctx: &mut ReaderContext<'_>) -> ReaderResult {
    log::debug!("read_mesh for \"{}\"", ctx.node.name);
    ctx.prim().type_name = prim_type::MESH.to_string();
    let node = ctx.node;
    let Some(mesh) = node.mesh() else {
        return Ok(());
    };

    ctx.create_property(
        "points",
        ValueTypeName::Point3fArray,
        Value::Float3Array(layers::points(node, mesh)),
        None,
        display_group::MESH,
    )?;

    let normals = layers::normals(mesh);
    report_misses(ctx, "normals", &normals);
    let prop = ctx.create_property(
        "normals",
        ValueTypeName::Normal3fArray,
        Value::Float3Array(normals.values),
        None,
        display_group::MESH,
    )?;
    set_interpolation(prop, interpolation::FACE_VARYING);

    let tangents = layers::tangents(mesh);
    report_misses(ctx, "tangents", &tangents);
    let prop = ctx.create_property(
        "tangents",
        ValueTypeName::Normal3fArray,
        Value::Float3Array(tangents.values),
        None,
        display_group::MESH,
    )?;
    set_interpolation(prop, interpolation::FACE_VARYING);

    if layers::has_vertex_colors(mesh) {
        let colors = layers::vertex_colors(mesh);
        report_misses(ctx, "primvars:displayColor", &colors);
        let prop = ctx.create_property(
            "primvars:displayColor",
            ValueTypeName::Color3fArray,
            Value::Float3Array(colors.values),
            None,
            display_group::PRIMVARS,
        )?;
        set_interpolation(prop, interpolation::VERTEX);
    }

    ctx.create_property(
        "faceVertexCounts",
        ValueTypeName::IntArray,
        Value::IntArray(layers::face_vertex_counts(mesh)),
        None,
        display_group::MESH,
    )?;
    ctx.create_property(
        "faceVertexIndices",
        ValueTypeName::IntArray,
        Value::IntArray(layers::face_vertex_indices(mesh)),
        None,
        display_group::MESH,
    )?;

    if let Some(skin) = mesh.skin() {
        read_skin_binding(ctx, skin, mesh.control_point_count())?;
    }

    for set in layers::uv_sets(mesh) {
        report_misses(ctx, &set.name, &set.coords);
        let prop = ctx.create_property(
            &set.name,
            ValueTypeName::TexCoord2fArray,
            Value::Float2Array(set.coords.values),
            None,
            display_group::PRIMVARS,
        )?;
        set_interpolation(prop, interpolation::FACE_VARYING);
    }

    ctx.create_uniform_property(
        "orientation",
        ValueTypeName::Token,
        Value::token(tokens::RIGHT_HANDED),
        display_group::MESH,
    )?;
    ctx.create_uniform_property(
        "subdivisionScheme",
        ValueTypeName::Token,
        Value::token(tokens::NONE),
        display_group::MESH,
    )?;
    Ok(())
}

fn read_skin_binding(
    ctx: &mut ReaderContext<'_>,
    skin: &Skin,
    control_points: usize,
) -> ReaderResult {
    ctx.prim().metadata.insert(
        field::API_SCHEMAS.to_string(),
        Value::TokenListOp(vec![tokens::SKEL_BINDING_API.to_string()]),
    );

    let binding = skin::extract(
        ctx.scene,
        ctx.id,
        skin,
        control_points,
        &ctx.root_path,
        ctx.diagnostics,
    )?;
    if binding.joints.is_empty() {
        ctx.warn(
            None,
            format!(
                "a skin is defined for \"{}\" but no joints could be extracted",
                ctx.node.name
            ),
        );
        return Ok(());
    }

    let bind = to_matrix4(without_scale(ctx.scene.global_transform(ctx.id, None, 0.0)));
    let element_size = binding.influences_per_vertex as i32;

    ctx.create_uniform_property(
        "skel:joints",
        ValueTypeName::TokenArray,
        Value::TokenArray(binding.joints),
        display_group::SKEL_BINDING,
    )?;

    let prop = ctx.create_property(
        "primvars:skel:jointIndices",
        ValueTypeName::IntArray,
        Value::IntArray(binding.joint_indices),
        None,
        display_group::SKEL_BINDING,
    )?;
    set_interpolation(prop, interpolation::VERTEX);
    set_metadata(prop, field::ELEMENT_SIZE, Value::Int(element_size));

    let prop = ctx.create_property(
        "primvars:skel:jointWeights",
        ValueTypeName::FloatArray,
        Value::FloatArray(binding.joint_weights),
        None,
        display_group::SKEL_BINDING,
    )?;
    set_interpolation(prop, interpolation::VERTEX);
    set_metadata(prop, field::ELEMENT_SIZE, Value::Int(element_size));

    ctx.create_property(
        "primvars:skel:geomBindTransform",
        ValueTypeName::Matrix4d,
        Value::Matrix4d(bind),
        None,
        display_group::SKEL_BINDING,
    )?;

    ctx.create_relationship(
        "skel:skeleton",
        binding.skeleton_path,
        display_group::SKEL_BINDING,
    )?;
    Ok(())
}
