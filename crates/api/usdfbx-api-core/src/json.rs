//! JSON rendering of a stage for inspection and golden comparisons.
//!
//! Output shape:
//! ```text
//! { "prims": [ { "path": "/ROOT", "typeName": "Xform", "metadata": {...},
//!                "children": [...], "properties": { "<name>": <Property> } } ] }
//! ```
//! The pseudo-root is omitted.

use serde_json::{json, Map, Value as JsonValue};
use thiserror::Error;

use crate::stage::Stage;

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Stage {
    pub fn to_json(&self) -> Result<JsonValue, JsonError> {
        let mut prims = Vec::with_capacity(self.prim_count());
        for (path, prim) in self.prims() {
            if path.is_absolute_root() {
                continue;
            }
            let mut props = Map::new();
            for (name, prop) in self.properties_of(path) {
                let value = serde_json::to_value(prop).map_err(|source| JsonError::Serialize {
                    what: format!("{path}.{name}"),
                    source,
                })?;
                props.insert(name.to_string(), value);
            }
            let metadata =
                serde_json::to_value(&prim.metadata).map_err(|source| JsonError::Serialize {
                    what: path.to_string(),
                    source,
                })?;
            prims.push(json!({
                "path": path.to_string(),
                "typeName": prim.type_name,
                "metadata": metadata,
                "children": prim.children,
                "properties": props,
            }));
        }
        Ok(json!({ "prims": prims }))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ScenePath, SceneSink, Stage, Value, ValueTypeName, Variability};

    #[test]
    fn renders_prims_and_properties() {
        let mut stage = Stage::new();
        let path = ScenePath::parse("/ROOT.purpose").unwrap();
        stage.get_or_add_prim(&path).type_name = "Xform".into();
        stage
            .add_property(&path, ValueTypeName::Token, Variability::Uniform)
            .default = Value::token("default");

        let json = stage.to_json().unwrap();
        let prims = json["prims"].as_array().unwrap();
        assert_eq!(prims.len(), 1);
        assert_eq!(prims[0]["path"], "/ROOT");
        assert_eq!(prims[0]["typeName"], "Xform");
        let purpose = &prims[0]["properties"]["purpose"];
        assert_eq!(purpose["variability"], "uniform");
        assert_eq!(purpose["typeName"], "token");
        assert_eq!(purpose["default"]["data"], "default");
    }
}
