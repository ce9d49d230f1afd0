//! Target prims, properties and the sink they are authored into.
//!
//! `SceneSink` is the seam between the transcoder and whatever holds the resulting scene
//! description. `Stage` is the in-memory implementation used by the translator and tests.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::path::ScenePath;
use crate::value::Value;
use crate::value_type::{ValueTypeName, Variability};

/// Insertion-ordered metadata entries (`displayGroup`, `interpolation`, `apiSchemas`, ...).
pub type Metadata = IndexMap<String, Value>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prim {
    /// Schema type (`Xform`, `Mesh`, ...); empty until a reader assigns one.
    pub type_name: String,
    pub metadata: Metadata,
    /// Child prim names in creation order.
    pub children: Vec<String>,
    /// Property names in creation order.
    pub properties: Vec<String>,
}

impl Prim {
    fn add_child(&mut self, name: &str) {
        if !self.children.iter().any(|c| c == name) {
            self.children.push(name.to_string());
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub type_name: ValueTypeName,
    pub variability: Variability,
    pub custom: bool,
    pub default: Value,
    /// Strictly increasing in time.
    pub time_samples: Vec<(f64, Value)>,
    pub metadata: Metadata,
    /// Relationship targets; empty for attributes.
    pub target_paths: Vec<ScenePath>,
}

impl Property {
    pub fn new(type_name: ValueTypeName, variability: Variability) -> Self {
        Self {
            type_name,
            variability,
            custom: false,
            default: Value::Empty,
            time_samples: Vec::new(),
            metadata: Metadata::new(),
            target_paths: Vec::new(),
        }
    }

    /// Insert a sample keeping time order; an existing sample at `time` is replaced.
    pub fn set_time_sample(&mut self, time: f64, value: Value) {
        match self
            .time_samples
            .binary_search_by(|(t, _)| t.total_cmp(&time))
        {
            Ok(i) => self.time_samples[i].1 = value,
            Err(i) => self.time_samples.insert(i, (time, value)),
        }
    }

    pub fn add_target(&mut self, path: ScenePath) {
        if !self.target_paths.contains(&path) {
            self.target_paths.push(path);
        }
    }

    pub fn is_relationship(&self) -> bool {
        !self.target_paths.is_empty()
    }
}

/// Destination of authored prims and properties.
///
/// `get_or_add_prim` must be idempotent: asking twice for the same path yields the same
/// prim and the parent's child list holds its name once.
pub trait SceneSink {
    /// Return the prim at `path`, creating it and any missing ancestors. Property paths
    /// resolve to their owning prim.
    fn get_or_add_prim(&mut self, path: &ScenePath) -> &mut Prim;

    fn prim_at_path(&self, path: &ScenePath) -> Option<&Prim>;

    /// Create the property at `path` (a property path), or return the existing one.
    fn add_property(
        &mut self,
        path: &ScenePath,
        type_name: ValueTypeName,
        variability: Variability,
    ) -> &mut Property;

    fn property_at_path(&self, path: &ScenePath) -> Option<&Property>;
}

/// In-memory scene description keyed by path.
#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    prims: IndexMap<ScenePath, Prim>,
    properties: IndexMap<ScenePath, Property>,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    /// An empty stage holding only the pseudo-root at `/`.
    pub fn new() -> Self {
        let mut prims = IndexMap::new();
        prims.insert(ScenePath::absolute_root(), Prim::default());
        Self {
            prims,
            properties: IndexMap::new(),
        }
    }

    pub fn prims(&self) -> impl Iterator<Item = (&ScenePath, &Prim)> {
        self.prims.iter()
    }

    pub fn properties(&self) -> impl Iterator<Item = (&ScenePath, &Property)> {
        self.properties.iter()
    }

    /// Number of prims excluding the pseudo-root.
    pub fn prim_count(&self) -> usize {
        self.prims.len() - 1
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Look up a property by its string path, e.g. `/ROOT/Cube.points`.
    pub fn property(&self, path: &str) -> Option<&Property> {
        let path = ScenePath::parse(path).ok()?;
        self.properties.get(&path)
    }

    /// Look up a prim by its string path.
    pub fn prim(&self, path: &str) -> Option<&Prim> {
        let path = ScenePath::parse(path).ok()?;
        self.prims.get(&path)
    }

    /// Properties of the prim at `prim`, in creation order.
    pub fn properties_of<'a>(
        &'a self,
        prim: &'a ScenePath,
    ) -> impl Iterator<Item = (&'a str, &'a Property)> + 'a {
        self.prims
            .get(prim)
            .into_iter()
            .flat_map(|p| p.properties.iter())
            .filter_map(move |name| {
                let path = prim.append_property(name).ok()?;
                let (key, prop) = self.properties.get_key_value(&path)?;
                Some((key.name(), prop))
            })
    }
}

impl SceneSink for Stage {
    fn get_or_add_prim(&mut self, path: &ScenePath) -> &mut Prim {
        let path = path.prim_path();
        if !self.prims.contains_key(&path) {
            if let Some(parent) = path.parent_path() {
                self.get_or_add_prim(&parent).add_child(path.name());
            }
        }
        self.prims.entry(path).or_default()
    }

    fn prim_at_path(&self, path: &ScenePath) -> Option<&Prim> {
        self.prims.get(path)
    }

    fn add_property(
        &mut self,
        path: &ScenePath,
        type_name: ValueTypeName,
        variability: Variability,
    ) -> &mut Property {
        if !self.properties.contains_key(path) {
            let prim = self.get_or_add_prim(path);
            prim.properties.push(path.name().to_string());
        }
        self.properties
            .entry(path.clone())
            .or_insert_with(|| Property::new(type_name, variability))
    }

    fn property_at_path(&self, path: &ScenePath) -> Option<&Property> {
        self.properties.get(path)
    }
}
