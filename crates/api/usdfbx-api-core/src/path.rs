//! ScenePath parsing, composition and formatting.
//!
//! Grammar:
//!   `/` (absolute root)
//!   `/Prim/Child` (absolute prim path)
//!   `Prim/Child` (relative prim path)
//!   `/Prim/Child.namespace:property` (property path)
//!
//! Prim segments are identifiers (`[A-Za-z_][A-Za-z0-9_]*`); property names are one or
//! more identifiers joined by `:`. Source names are made valid with [`clean_name`].

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("invalid prim name '{0}'")]
    InvalidPrimName(String),
    #[error("invalid property name '{0}'")]
    InvalidPropertyName(String),
    #[error("path '{0}' is a property path")]
    NotAPrimPath(String),
    #[error("path '{0}' is not relative")]
    NotRelative(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScenePath {
    absolute: bool,
    prims: Vec<String>,
    property: Option<String>,
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_property_name(s: &str) -> bool {
    !s.is_empty() && s.split(':').all(is_identifier)
}

/// Make an arbitrary source name usable as a prim or property segment.
///
/// Characters outside `[A-Za-z0-9_]` become `_`; an empty name or one starting with a
/// digit gets a leading `_`.
pub fn clean_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

impl ScenePath {
    pub fn absolute_root() -> Self {
        Self {
            absolute: true,
            prims: Vec::new(),
            property: None,
        }
    }

    /// A relative path with a single prim segment.
    pub fn relative(name: &str) -> Result<Self, PathError> {
        if !is_identifier(name) {
            return Err(PathError::InvalidPrimName(name.to_string()));
        }
        Ok(Self {
            absolute: false,
            prims: vec![name.to_string()],
            property: None,
        })
    }

    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        let (absolute, rest) = match s.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (prim_part, property) = match rest.split_once('.') {
            Some((p, prop)) => {
                if !is_property_name(prop) {
                    return Err(PathError::InvalidPropertyName(prop.to_string()));
                }
                (p, Some(prop.to_string()))
            }
            None => (rest, None),
        };
        let prims: Vec<String> = if prim_part.is_empty() {
            Vec::new()
        } else {
            prim_part
                .split('/')
                .map(|seg| {
                    if is_identifier(seg) {
                        Ok(seg.to_string())
                    } else {
                        Err(PathError::InvalidPrimName(seg.to_string()))
                    }
                })
                .collect::<Result<_, _>>()?
        };
        if prims.is_empty() && (!absolute || property.is_some()) {
            return Err(PathError::InvalidPrimName(s.to_string()));
        }
        Ok(Self {
            absolute,
            prims,
            property,
        })
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn is_absolute_root(&self) -> bool {
        self.absolute && self.prims.is_empty() && self.property.is_none()
    }

    pub fn is_property_path(&self) -> bool {
        self.property.is_some()
    }

    /// Prim name segments, outermost first.
    pub fn prim_names(&self) -> impl Iterator<Item = &str> {
        self.prims.iter().map(|s| s.as_str())
    }

    /// Final element: the property name for property paths, else the last prim name.
    /// Empty for the absolute root.
    pub fn name(&self) -> &str {
        match &self.property {
            Some(p) => p,
            None => self.prims.last().map(|s| s.as_str()).unwrap_or(""),
        }
    }

    fn require_prim(&self) -> Result<(), PathError> {
        if self.property.is_some() {
            return Err(PathError::NotAPrimPath(self.to_string()));
        }
        Ok(())
    }

    pub fn append_child(&self, name: &str) -> Result<Self, PathError> {
        self.require_prim()?;
        if !is_identifier(name) {
            return Err(PathError::InvalidPrimName(name.to_string()));
        }
        let mut out = self.clone();
        out.prims.push(name.to_string());
        Ok(out)
    }

    pub fn append_property(&self, name: &str) -> Result<Self, PathError> {
        self.require_prim()?;
        if !is_property_name(name) {
            return Err(PathError::InvalidPropertyName(name.to_string()));
        }
        if self.prims.is_empty() {
            return Err(PathError::InvalidPrimName(self.to_string()));
        }
        let mut out = self.clone();
        out.property = Some(name.to_string());
        Ok(out)
    }

    /// Append a relative path (prim segments and optional property) to this prim path.
    pub fn append_path(&self, rel: &ScenePath) -> Result<Self, PathError> {
        self.require_prim()?;
        if rel.absolute {
            return Err(PathError::NotRelative(rel.to_string()));
        }
        let mut out = self.clone();
        out.prims.extend(rel.prims.iter().cloned());
        out.property = rel.property.clone();
        Ok(out)
    }

    /// Owning prim for property paths, parent prim for prim paths, `None` at the top.
    pub fn parent_path(&self) -> Option<Self> {
        if self.property.is_some() {
            return Some(self.prim_path());
        }
        if self.prims.is_empty() {
            return None;
        }
        if !self.absolute && self.prims.len() == 1 {
            return None;
        }
        let mut out = self.clone();
        out.prims.pop();
        Some(out)
    }

    pub fn prim_path(&self) -> Self {
        Self {
            absolute: self.absolute,
            prims: self.prims.clone(),
            property: None,
        }
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("/")?;
        }
        f.write_str(&self.prims.join("/"))?;
        if let Some(p) = &self.property {
            write!(f, ".{p}")?;
        }
        Ok(())
    }
}

impl FromStr for ScenePath {
    type Err = PathError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenePath::parse(s)
    }
}

impl Serialize for ScenePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ScenePath {
    fn deserialize<D>(deserializer: D) -> Result<ScenePath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ScenePath::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_property_path() {
        let p = ScenePath::parse("/ROOT/Arm.xformOp:translate").unwrap();
        assert!(p.is_absolute());
        assert!(p.is_property_path());
        assert_eq!(p.name(), "xformOp:translate");
        assert_eq!(p.prim_path().to_string(), "/ROOT/Arm");
        assert_eq!(p.to_string(), "/ROOT/Arm.xformOp:translate");
    }

    #[test]
    fn root_and_relative() {
        let root = ScenePath::parse("/").unwrap();
        assert!(root.is_absolute_root());
        assert_eq!(root.to_string(), "/");
        assert_eq!(root.parent_path(), None);

        let rel = ScenePath::parse("A/B").unwrap();
        assert!(!rel.is_absolute());
        assert_eq!(rel.parent_path().unwrap().to_string(), "A");
        assert_eq!(ScenePath::relative("A").unwrap().parent_path(), None);
    }

    #[test]
    fn append_rules() {
        let root = ScenePath::absolute_root();
        let a = root.append_child("ROOT").unwrap().append_child("A").unwrap();
        assert_eq!(a.to_string(), "/ROOT/A");
        let rel = ScenePath::parse("B/C").unwrap();
        assert_eq!(a.append_path(&rel).unwrap().to_string(), "/ROOT/A/B/C");
        assert!(a.append_path(&a).is_err());
        assert!(root.append_property("x").is_err());

        let prop = a.append_property("userProperties:speed").unwrap();
        assert!(prop.append_child("D").is_err());
        assert_eq!(prop.parent_path(), Some(a));
    }

    #[test]
    fn parse_rejects_bad_segments() {
        assert_eq!(ScenePath::parse(""), Err(PathError::Empty));
        assert!(ScenePath::parse("/ROOT//A").is_err());
        assert!(ScenePath::parse("/ROOT/has space").is_err());
        assert!(ScenePath::parse("/ROOT/1abc").is_err());
        assert!(ScenePath::parse("/ROOT.a::b").is_err());
        assert!(ScenePath::parse("/.a").is_err());
    }

    #[test]
    fn clean_names() {
        assert_eq!(clean_name("Bone 01"), "Bone_01");
        assert_eq!(clean_name("1st"), "_1st");
        assert_eq!(clean_name(""), "_");
        assert_eq!(clean_name("mixamorig:Hips"), "mixamorig_Hips");
    }

    #[test]
    fn serde_as_string() {
        let p = ScenePath::parse("/ROOT/A").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"/ROOT/A\"");
        let back: ScenePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
