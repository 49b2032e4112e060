//! Entity exporters.
//!
//! Each exporter converts one host node (or one queued resource) into
//! document entities. Shared resources go through the registries in
//! [`ExportContext`]; exporters never export a dependency directly.

pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod skin;
pub mod texture;

pub use camera::CameraExporter;
pub use light::{default_light, LightExporter};
pub use material::{MaterialExporter, QueuedMaterial};
pub use mesh::MeshExporter;
pub use skin::{AccumulatedSkin, SkinExporter};

use crate::document::BabylonScene;
use crate::error::Result;
use crate::pipeline::ExportOptions;
use crate::registry::{IdAllocator, MaterialRegistry, SkinAccumulator, TextureRegistry};
use crate::types::{NodeHandle, NodeTransform, RotationMode};
use std::collections::HashMap;

/// Converts one host item into document entities.
pub trait EntityExporter {
    /// Host item this exporter consumes.
    type Node;
    /// Value handed back for an emitted entity (usually its id).
    type Output;

    /// Human-readable kind used in diagnostics.
    const KIND: &'static str;

    /// Name of the host item, for diagnostics.
    fn node_name(node: &Self::Node) -> &str;

    /// Convert `node`. `Ok(None)` means the node was deliberately skipped.
    fn export(&self, node: &Self::Node, ctx: &mut ExportContext) -> Result<Option<Self::Output>>;
}

/// A warning raised by an exporter, forwarded by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub text: String,
    pub rank: u32,
}

/// Mutable state shared by all exporters during one export.
#[derive(Debug)]
pub struct ExportContext {
    pub scene: BabylonScene,
    pub options: ExportOptions,
    pub ids: IdAllocator,
    pub materials: MaterialRegistry,
    pub textures: TextureRegistry,
    pub skins: SkinAccumulator,
    /// Texture files written to the output directory.
    pub textures_copied: usize,
    node_ids: HashMap<NodeHandle, String>,
    parent_links: Vec<(String, NodeHandle)>,
    notes: Vec<Note>,
}

impl ExportContext {
    pub fn new(scene: BabylonScene, options: ExportOptions) -> Self {
        Self {
            scene,
            options,
            ids: IdAllocator::new(),
            materials: MaterialRegistry::new(),
            textures: TextureRegistry::new(),
            skins: SkinAccumulator::new(),
            textures_copied: 0,
            node_ids: HashMap::new(),
            parent_links: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Queue a warning for the diagnostics sink.
    pub fn warn(&mut self, text: impl Into<String>, rank: u32) {
        self.notes.push(Note {
            text: text.into(),
            rank,
        });
    }

    pub fn take_notes(&mut self) -> Vec<Note> {
        std::mem::take(&mut self.notes)
    }

    /// Remember which entity a host node became, and the node's parent.
    pub fn register_node(&mut self, handle: NodeHandle, id: &str, parent: Option<NodeHandle>) {
        self.node_ids.insert(handle, id.to_string());
        if let Some(parent) = parent {
            self.parent_links.push((id.to_string(), parent));
        }
    }

    /// Resolve parent handles into parent ids. Returns the ids of entities
    /// whose parent was never exported.
    pub fn resolve_parents(&mut self) -> Vec<String> {
        let mut orphans = Vec::new();
        for (child, parent) in std::mem::take(&mut self.parent_links) {
            match self.node_ids.get(&parent) {
                Some(parent_id) => {
                    let parent_id = parent_id.clone();
                    set_parent(&mut self.scene, &child, parent_id);
                }
                None => orphans.push(child),
            }
        }
        orphans
    }

    pub fn rotation_mode(&self) -> RotationMode {
        self.scene.rotation_mode
    }
}

fn set_parent(scene: &mut BabylonScene, child: &str, parent_id: String) {
    if let Some(mesh) = scene.meshes.iter_mut().find(|m| m.id == child) {
        mesh.parent_id = Some(parent_id);
    } else if let Some(camera) = scene.cameras.iter_mut().find(|c| c.id == child) {
        camera.parent_id = Some(parent_id);
    } else if let Some(light) = scene.lights.iter_mut().find(|l| l.id == child) {
        light.parent_id = Some(parent_id);
    }
}

/// Rotation fields for a node, exactly one of which is set.
pub(crate) fn rotation_fields(
    transform: &NodeTransform,
    mode: RotationMode,
) -> (Option<[f32; 3]>, Option<[f32; 4]>) {
    match mode {
        RotationMode::Quaternion => {
            let q = transform.quaternion();
            (None, Some([q.x, q.y, q.z, q.w]))
        }
        RotationMode::Euler => (Some(transform.euler_angles()), None),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn context() -> ExportContext {
        ExportContext::new(BabylonScene::new("/tmp"), ExportOptions::default())
    }
}
