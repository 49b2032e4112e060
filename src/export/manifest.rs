//! Offline caching manifest written next to the document.

use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: u32,
    pub enable_scene_offline: bool,
    pub enable_textures_offline: bool,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: 1,
            enable_scene_offline: true,
            enable_textures_offline: true,
        }
    }
}

/// `scene.babylon` -> `scene.babylon.manifest`.
pub fn manifest_path(document: &Path) -> PathBuf {
    let mut path = document.as_os_str().to_owned();
    path.push(".manifest");
    PathBuf::from(path)
}

/// Write the manifest for `document` and return its path.
pub fn write_manifest(document: &Path, manifest: &Manifest) -> Result<PathBuf> {
    let path = manifest_path(document);
    std::fs::write(&path, serde_json::to_vec_pretty(manifest)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_shape() {
        let value = serde_json::to_value(Manifest::default()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "version": 1,
                "enableSceneOffline": true,
                "enableTexturesOffline": true
            })
        );
    }

    #[test]
    fn test_manifest_path() {
        assert_eq!(
            manifest_path(Path::new("out/scene.babylon")),
            PathBuf::from("out/scene.babylon.manifest")
        );
    }
}
