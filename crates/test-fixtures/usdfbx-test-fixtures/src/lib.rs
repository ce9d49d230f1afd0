//! Source scenes and translation configs shared by the workspace tests.
//!
//! `fixtures/manifest.json` names every scene; an entry is either the scene file or the
//! scene plus the config it should be translated with.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<SceneManifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures/manifest.json should list scenes")
});

#[derive(Debug, Deserialize)]
struct SceneManifest {
    scenes: HashMap<String, SceneEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SceneEntry {
    Scene(String),
    WithConfig {
        scene: String,
        #[serde(default)]
        config: Option<String>,
    },
}

impl SceneEntry {
    fn scene_file(&self) -> &str {
        match self {
            SceneEntry::Scene(file) => file,
            SceneEntry::WithConfig { scene, .. } => scene,
        }
    }

    fn config_file(&self) -> Option<&str> {
        match self {
            SceneEntry::Scene(_) => None,
            SceneEntry::WithConfig { config, .. } => config.as_deref(),
        }
    }
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn entry(name: &str) -> Result<&'static SceneEntry> {
    MANIFEST
        .scenes
        .get(name)
        .ok_or_else(|| anyhow!("scene '{name}' is not listed in fixtures/manifest.json"))
}

fn read_file(file: &str) -> Result<String> {
    let path = fixtures_dir().join(file);
    fs::read_to_string(&path)
        .with_context(|| format!("cannot read scene fixture file {}", path.display()))
}

fn parse_file<T: DeserializeOwned>(name: &str, file: &str) -> Result<T> {
    let text = read_file(file)?;
    serde_json::from_str(&text)
        .with_context(|| format!("scene fixture '{name}': {file} does not deserialize"))
}

pub mod scenes {
    use super::*;

    /// Names of every listed scene.
    pub fn keys() -> Vec<String> {
        MANIFEST.scenes.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        read_file(entry(name)?.scene_file())
    }

    /// Deserialize the scene, typically into a `SourceScene`.
    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        parse_file(name, entry(name)?.scene_file())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(fixtures_dir().join(entry(name)?.scene_file()))
    }

    /// The translation config paired with the scene; `None` means defaults.
    pub fn config<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        match entry(name)?.config_file() {
            Some(file) => parse_file(name, file).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scene_and_config_parses() {
        for key in scenes::keys() {
            let path = scenes::path(&key).unwrap();
            assert!(path.exists(), "missing scene file {}", path.display());
            let _: serde_json::Value = scenes::load(&key).unwrap();
            let _: Option<serde_json::Value> = scenes::config(&key).unwrap();
        }
    }

    #[test]
    fn unlisted_scene_names_the_manifest() {
        let err = scenes::json("does-not-exist").unwrap_err();
        assert!(err.to_string().contains("does-not-exist"));
        assert!(err.to_string().contains("manifest.json"));
        assert!(scenes::config::<serde_json::Value>("does-not-exist").is_err());
    }

    #[test]
    fn scenes_without_config_use_defaults() {
        let config: Option<serde_json::Value> = scenes::config("skinned-arm").unwrap();
        assert!(config.is_none());
        let config: Option<serde_json::Value> = scenes::config("camera-rig").unwrap();
        assert!(config.is_some());
    }
}
