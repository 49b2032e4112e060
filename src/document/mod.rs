//! The output scene document.
//!
//! Pure data mirroring the runtime's scene file layout. Field names follow the
//! runtime's JSON schema, hence the explicit serde renames.

mod camera;
mod light;
mod material;
mod mesh;
mod skeleton;

pub use camera::BabylonCamera;
pub use light::{BabylonLight, LightType};
pub use material::{BabylonMaterial, BabylonMultiMaterial, BabylonTexture};
pub use mesh::{BabylonMesh, BabylonSubMesh};
pub use skeleton::{BabylonBone, BabylonSkeleton};

use crate::types::RotationMode;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Fog modes understood by the runtime.
pub mod fog_mode {
    pub const NONE: u32 = 0;
    pub const EXP: u32 = 1;
    pub const LINEAR: u32 = 3;
}

/// Information about the tool that wrote the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub exporter_version: String,
    pub file: String,
}

impl Producer {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: "1".to_string(),
            exporter_version: env!("CARGO_PKG_VERSION").to_string(),
            file: file.into(),
        }
    }
}

/// Root of the exported document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BabylonScene {
    /// Directory the document is written to. Not part of the document.
    #[serde(skip)]
    pub output_path: PathBuf,
    /// Rotation representation used by every node in this document.
    #[serde(skip)]
    pub rotation_mode: RotationMode,

    pub producer: Producer,
    pub auto_clear: bool,
    pub clear_color: [f32; 3],
    pub ambient_color: [f32; 3],
    pub gravity: [f32; 3],

    pub fog_mode: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fog_color: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fog_density: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fog_start: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fog_end: Option<f32>,

    pub cameras: Vec<BabylonCamera>,
    #[serde(rename = "activeCameraID", skip_serializing_if = "Option::is_none")]
    pub active_camera_id: Option<String>,
    pub meshes: Vec<BabylonMesh>,
    pub materials: Vec<BabylonMaterial>,
    pub multi_materials: Vec<BabylonMultiMaterial>,
    pub lights: Vec<BabylonLight>,
    pub skeletons: Vec<BabylonSkeleton>,
}

/// A reference that pointed nowhere and was removed during finalization.
#[derive(Debug, Clone, PartialEq)]
pub enum DanglingReference {
    MeshMaterial { mesh: String, material_id: String },
    MeshSkeleton { mesh: String, skeleton_id: i32 },
    SubMaterial { multi_material: String, material_id: String },
    ActiveCamera { camera_id: String },
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DanglingReference::MeshMaterial { mesh, material_id } => {
                write!(f, "Mesh {} references missing material {}", mesh, material_id)
            }
            DanglingReference::MeshSkeleton { mesh, skeleton_id } => {
                write!(f, "Mesh {} references missing skeleton {}", mesh, skeleton_id)
            }
            DanglingReference::SubMaterial {
                multi_material,
                material_id,
            } => write!(
                f,
                "Multi-material {} references missing material {}",
                multi_material, material_id
            ),
            DanglingReference::ActiveCamera { camera_id } => {
                write!(f, "Active camera {} is not in the document", camera_id)
            }
        }
    }
}

impl BabylonScene {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            rotation_mode: RotationMode::Quaternion,
            producer: Producer::new(""),
            auto_clear: true,
            clear_color: [0.2, 0.2, 0.3],
            ambient_color: [0.0, 0.0, 0.0],
            gravity: [0.0, 0.0, 0.0],
            fog_mode: fog_mode::NONE,
            fog_color: None,
            fog_density: None,
            fog_start: None,
            fog_end: None,
            cameras: Vec::new(),
            active_camera_id: None,
            meshes: Vec::new(),
            materials: Vec::new(),
            multi_materials: Vec::new(),
            lights: Vec::new(),
            skeletons: Vec::new(),
        }
    }

    /// Total number of material entities, standard and multi.
    pub fn material_count(&self) -> usize {
        self.materials.len() + self.multi_materials.len()
    }

    pub fn camera(&self, id: &str) -> Option<&BabylonCamera> {
        self.cameras.iter().find(|c| c.id == id)
    }

    pub fn active_camera(&self) -> Option<&BabylonCamera> {
        self.active_camera_id.as_deref().and_then(|id| self.camera(id))
    }

    /// Resolve deferred values and enforce that every reference resolves
    /// inside this document. References that do not resolve are removed and
    /// returned so the caller can report them.
    pub fn finalize(&mut self) -> Vec<DanglingReference> {
        let ambient = self.ambient_color;
        for material in &mut self.materials {
            material.ambient.get_or_insert(ambient);
        }

        let material_ids: HashSet<String> = self
            .materials
            .iter()
            .map(|m| m.id.clone())
            .chain(self.multi_materials.iter().map(|m| m.id.clone()))
            .collect();
        let skeleton_ids: HashSet<i32> = self.skeletons.iter().map(|s| s.id).collect();

        let mut dangling = Vec::new();

        for mesh in &mut self.meshes {
            if let Some(id) = &mesh.material_id {
                if !material_ids.contains(id) {
                    dangling.push(DanglingReference::MeshMaterial {
                        mesh: mesh.name.clone(),
                        material_id: id.clone(),
                    });
                    mesh.material_id = None;
                }
            }
            if let Some(id) = mesh.skeleton_id {
                if !skeleton_ids.contains(&id) {
                    dangling.push(DanglingReference::MeshSkeleton {
                        mesh: mesh.name.clone(),
                        skeleton_id: id,
                    });
                    mesh.clear_skin();
                }
            }
        }

        let standard_ids: HashSet<&str> = self.materials.iter().map(|m| m.id.as_str()).collect();
        for multi in &mut self.multi_materials {
            for slot in &mut multi.materials {
                if let Some(id) = slot {
                    if !standard_ids.contains(id.as_str()) {
                        dangling.push(DanglingReference::SubMaterial {
                            multi_material: multi.name.clone(),
                            material_id: id.clone(),
                        });
                        *slot = None;
                    }
                }
            }
        }

        if let Some(id) = &self.active_camera_id {
            if self.camera(id).is_none() {
                dangling.push(DanglingReference::ActiveCamera {
                    camera_id: id.clone(),
                });
                self.active_camera_id = None;
            }
        }

        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(name: &str, material: Option<&str>) -> BabylonMesh {
        let mut mesh = BabylonMesh::new(format!("id-{}", name), name);
        mesh.material_id = material.map(str::to_string);
        mesh
    }

    #[test]
    fn test_finalize_applies_scene_ambient() {
        let mut scene = BabylonScene::new("/tmp");
        scene.ambient_color = [0.1, 0.2, 0.3];
        scene.materials.push(BabylonMaterial::new("m1", "First"));
        let mut explicit = BabylonMaterial::new("m2", "Second");
        explicit.ambient = Some([1.0, 1.0, 1.0]);
        scene.materials.push(explicit);

        assert!(scene.finalize().is_empty());
        assert_eq!(scene.materials[0].ambient, Some([0.1, 0.2, 0.3]));
        assert_eq!(scene.materials[1].ambient, Some([1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_finalize_removes_dangling_references() {
        let mut scene = BabylonScene::new("/tmp");
        scene.materials.push(BabylonMaterial::new("m1", "Ok"));
        scene.meshes.push(mesh("a", Some("m1")));
        scene.meshes.push(mesh("b", Some("missing")));
        scene.multi_materials.push(BabylonMultiMaterial {
            name: "Multi".into(),
            id: "mm".into(),
            materials: vec![Some("m1".into()), Some("gone".into()), None],
        });
        scene.active_camera_id = Some("nope".into());

        let dangling = scene.finalize();
        assert_eq!(dangling.len(), 3);
        assert_eq!(scene.meshes[0].material_id.as_deref(), Some("m1"));
        assert_eq!(scene.meshes[1].material_id, None);
        assert_eq!(scene.multi_materials[0].materials, vec![Some("m1".into()), None, None]);
        assert_eq!(scene.active_camera_id, None);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut scene = BabylonScene::new("/tmp");
        scene.active_camera_id = Some("c".into());
        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["activeCameraID"], "c");
        assert_eq!(value["autoClear"], true);
        assert!(value.get("multiMaterials").is_some());
        assert!(value.get("fogStart").is_none());
        assert!(value.get("outputPath").is_none());
    }
}
