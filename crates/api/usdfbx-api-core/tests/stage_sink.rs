use usdfbx_api_core::{
    coercion::coerce, tokens, ScenePath, SceneSink, Stage, Value, ValueTypeName, Variability,
};

fn path(s: &str) -> ScenePath {
    ScenePath::parse(s).expect("valid path")
}

#[test]
fn shared_joint_path_is_created_once() {
    let mut stage = Stage::new();
    let joint = path("/ROOT/Hips/Spine");

    // Two independent writers touch the same joint prim.
    stage.get_or_add_prim(&joint).type_name = tokens::prim_type::XFORM.into();
    stage
        .get_or_add_prim(&joint)
        .metadata
        .insert(tokens::field::ACTIVE.into(), Value::Bool(true));

    let hips = stage.prim("/ROOT/Hips").unwrap();
    assert_eq!(hips.children, vec!["Spine".to_string()]);
    let spine = stage.prim("/ROOT/Hips/Spine").unwrap();
    assert_eq!(spine.type_name, "Xform");
    assert_eq!(spine.metadata.get("active"), Some(&Value::Bool(true)));
    assert_eq!(stage.prim_count(), 3);
}

#[test]
fn relationship_targets_are_unique() {
    let mut stage = Stage::new();
    let rel = path("/ROOT/Mesh.skel:skeleton");
    let prop = stage.add_property(&rel, ValueTypeName::Token, Variability::Uniform);
    prop.add_target(path("/ROOT/Hips"));
    prop.add_target(path("/ROOT/Hips"));
    let prop = stage.property_at_path(&rel).unwrap();
    assert!(prop.is_relationship());
    assert_eq!(prop.target_paths.len(), 1);
    assert_eq!(prop.default, Value::Empty);
}

#[test]
fn samples_and_default_share_declared_type() {
    let mut stage = Stage::new();
    let attr = path("/ROOT/Cam.focalLength");
    let prop = stage.add_property(&attr, ValueTypeName::Float, Variability::Varying);
    prop.default = coerce(&Value::Double(35.0), ValueTypeName::Float).unwrap();
    for frame in 0..3 {
        let v = coerce(&Value::Double(35.0 + frame as f64), ValueTypeName::Float).unwrap();
        prop.set_time_sample(frame as f64, v);
    }
    let prop = stage.property("/ROOT/Cam.focalLength").unwrap();
    assert!(ValueTypeName::Float.accepts(&prop.default));
    assert!(prop
        .time_samples
        .iter()
        .all(|(_, v)| ValueTypeName::Float.accepts(v)));
    assert_eq!(prop.time_samples[2], (2.0, Value::Float(37.0)));
}

#[test]
fn json_export_lists_children_in_creation_order() {
    let mut stage = Stage::new();
    stage.get_or_add_prim(&path("/ROOT/B"));
    stage.get_or_add_prim(&path("/ROOT/A"));
    stage.get_or_add_prim(&path("/ROOT/B"));
    let json = stage.to_json().unwrap();
    assert_eq!(json["prims"][0]["path"], "/ROOT");
    assert_eq!(json["prims"][0]["children"], serde_json::json!(["B", "A"]));
    assert_eq!(json["prims"].as_array().unwrap().len(), 3);
}
