//! The host scene query boundary.
//!
//! The exporter never touches an authoring application directly. It reads the
//! scene through [`SceneHost`], which hands out owned snapshots of nodes so
//! that the orchestrator can interleave reads with event pumping.

pub mod snapshot;

pub use snapshot::SnapshotHost;

use crate::error::HostError;
use crate::types::{
    Color3, CoordinateSystem, MaterialHandle, NodeHandle, NodeTransform, PropertyValue, SkinHandle,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Custom node property that excludes a node from export.
pub const NO_EXPORT_PROPERTY: &str = "babylonjs_noexport";

/// Trait for host scene sources.
///
/// All methods are called from the thread that invoked the export.
pub trait SceneHost {
    /// Select the coordinate convention node data is converted into.
    fn set_coordinate_system(&mut self, system: CoordinateSystem);

    /// Start a query session. With `selection_only`, node enumeration only
    /// returns selected nodes.
    fn initialise(&mut self, selection_only: bool);

    /// Camera nodes in host enumeration order.
    fn cameras(&self) -> Vec<HostCamera>;

    /// Mesh nodes in host enumeration order.
    fn meshes(&self) -> Vec<HostMesh>;

    /// Light nodes in host enumeration order.
    fn lights(&self) -> Vec<HostLight>;

    /// Resolve a material handle.
    fn material(&self, handle: MaterialHandle) -> Option<HostMaterial>;

    /// Read a custom property attached to the scene root.
    fn scene_property(&self, name: &str) -> Option<PropertyValue>;

    /// Environment background color.
    fn background_color(&self) -> Color3;

    /// Environment ambient color.
    fn ambient_color(&self) -> Color3;

    /// Atmospheric effects in host order.
    fn atmospherics(&self) -> Vec<HostAtmospheric>;

    /// Save the authoring document. Best effort.
    fn save_document(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    /// Service the host's pending UI events. Called at every cancellation poll point.
    fn pump_events(&mut self) {}

    /// File name of the authoring document, if it has one.
    fn document_name(&self) -> Option<String> {
        None
    }
}

/// Read a scene flag, falling back to `default` when absent or not a flag.
pub fn scene_bool(host: &dyn SceneHost, name: &str, default: bool) -> bool {
    host.scene_property(name)
        .and_then(|v| v.as_bool())
        .unwrap_or(default)
}

/// Read a scene vector, falling back to `default` when absent or not a vector.
pub fn scene_vector3(host: &dyn SceneHost, name: &str, default: [f32; 3]) -> [f32; 3] {
    host.scene_property(name)
        .and_then(|v| v.as_vector3())
        .unwrap_or(default)
}

/// Data shared by every host node kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostNode {
    pub handle: NodeHandle,
    pub name: String,
    #[serde(default)]
    pub parent: Option<NodeHandle>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub transform: NodeTransform,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl HostNode {
    pub fn new(handle: u64, name: impl Into<String>) -> Self {
        Self {
            handle: NodeHandle(handle),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn bool_property(&self, name: &str, default: bool) -> bool {
        self.property(name).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    pub fn f32_property(&self, name: &str, default: f32) -> f32 {
        self.property(name).and_then(|v| v.as_f32()).unwrap_or(default)
    }

    /// Whether the node carries the no-export marker.
    pub fn is_excluded(&self) -> bool {
        self.bool_property(NO_EXPORT_PROPERTY, false)
    }
}

/// A camera node.
#[derive(Debug, Clone, Deserialize)]
pub struct HostCamera {
    #[serde(flatten)]
    pub node: HostNode,
    /// Vertical field of view in radians.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Look-at point for targeted cameras.
    #[serde(default)]
    pub target: Option<[f32; 3]>,
}

fn default_fov() -> f32 {
    0.8
}

fn default_near() -> f32 {
    1.0
}

fn default_far() -> f32 {
    10000.0
}

impl HostCamera {
    pub fn new(node: HostNode) -> Self {
        Self {
            node,
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            target: None,
        }
    }
}

/// Triangle geometry of a mesh node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostGeometry {
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    #[serde(default)]
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// A mesh node.
#[derive(Debug, Clone, Deserialize)]
pub struct HostMesh {
    #[serde(flatten)]
    pub node: HostNode,
    #[serde(default)]
    pub geometry: HostGeometry,
    #[serde(default)]
    pub material: Option<MaterialHandle>,
    #[serde(default)]
    pub skin: Option<HostSkinBinding>,
}

impl HostMesh {
    pub fn new(node: HostNode, geometry: HostGeometry) -> Self {
        Self {
            node,
            geometry,
            material: None,
            skin: None,
        }
    }
}

/// A skin modifier bound to a mesh.
#[derive(Debug, Clone, Deserialize)]
pub struct HostSkinBinding {
    pub skin: HostSkin,
    /// Four bone indices per vertex.
    #[serde(default)]
    pub bone_indices: Vec<[u32; 4]>,
    /// Four bone weights per vertex.
    #[serde(default)]
    pub bone_weights: Vec<[f32; 4]>,
}

/// The bone hierarchy of a skin, shared by every mesh bound to it.
#[derive(Debug, Clone, Deserialize)]
pub struct HostSkin {
    pub handle: SkinHandle,
    pub name: String,
    pub bones: Vec<HostBone>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostBone {
    pub name: String,
    /// Index of the parent bone in the same skin.
    #[serde(default)]
    pub parent: Option<usize>,
    /// Local bind matrix, column major.
    #[serde(default = "identity_matrix")]
    pub matrix: [f32; 16],
}

fn identity_matrix() -> [f32; 16] {
    glam::Mat4::IDENTITY.to_cols_array()
}

/// A host material.
#[derive(Debug, Clone, Deserialize)]
pub struct HostMaterial {
    pub handle: MaterialHandle,
    pub name: String,
    pub kind: HostMaterialKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMaterialKind {
    Standard(StandardMaterial),
    /// Container whose slots point to other materials. Empty slots are allowed.
    Multi { sub_materials: Vec<Option<MaterialHandle>> },
}

/// Parameters of a standard (Phong-like) material.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardMaterial {
    #[serde(default)]
    pub ambient: Option<Color3>,
    #[serde(default = "white")]
    pub diffuse: Color3,
    #[serde(default)]
    pub specular: Color3,
    #[serde(default)]
    pub emissive: Color3,
    #[serde(default = "default_specular_power")]
    pub specular_power: f32,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default)]
    pub two_sided: bool,
    #[serde(default)]
    pub wireframe: bool,
    #[serde(default)]
    pub textures: TextureSlots,
}

fn white() -> Color3 {
    Color3::WHITE
}

fn default_specular_power() -> f32 {
    64.0
}

fn default_alpha() -> f32 {
    1.0
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            ambient: None,
            diffuse: Color3::WHITE,
            specular: Color3::BLACK,
            emissive: Color3::BLACK,
            specular_power: default_specular_power(),
            alpha: default_alpha(),
            two_sided: false,
            wireframe: false,
            textures: TextureSlots::default(),
        }
    }
}

/// Texture maps of a standard material.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextureSlots {
    #[serde(default)]
    pub diffuse: Option<HostTexture>,
    #[serde(default)]
    pub ambient: Option<HostTexture>,
    #[serde(default)]
    pub opacity: Option<HostTexture>,
    #[serde(default)]
    pub reflection: Option<HostTexture>,
    #[serde(default)]
    pub emissive: Option<HostTexture>,
    #[serde(default)]
    pub specular: Option<HostTexture>,
    #[serde(default)]
    pub bump: Option<HostTexture>,
}

/// A bitmap texture reference.
#[derive(Debug, Clone, Deserialize)]
pub struct HostTexture {
    pub path: PathBuf,
    #[serde(default = "default_level")]
    pub level: f32,
    /// Explicit alpha flag; detected from the bitmap when absent.
    #[serde(default)]
    pub has_alpha: Option<bool>,
    #[serde(default = "default_scale")]
    pub u_scale: f32,
    #[serde(default = "default_scale")]
    pub v_scale: f32,
    #[serde(default)]
    pub u_offset: f32,
    #[serde(default)]
    pub v_offset: f32,
    #[serde(default)]
    pub coordinates_index: u32,
    #[serde(default = "default_wrap")]
    pub wrap_u: bool,
    #[serde(default = "default_wrap")]
    pub wrap_v: bool,
}

fn default_level() -> f32 {
    1.0
}

fn default_scale() -> f32 {
    1.0
}

fn default_wrap() -> bool {
    true
}

impl HostTexture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            level: default_level(),
            has_alpha: None,
            u_scale: 1.0,
            v_scale: 1.0,
            u_offset: 0.0,
            v_offset: 0.0,
            coordinates_index: 0,
            wrap_u: true,
            wrap_v: true,
        }
    }
}

/// A light node.
#[derive(Debug, Clone, Deserialize)]
pub struct HostLight {
    #[serde(flatten)]
    pub node: HostNode,
    pub kind: HostLightKind,
    #[serde(default = "white")]
    pub color: Color3,
    #[serde(default = "default_level")]
    pub intensity: f32,
    /// Attenuation end distance, when the light uses far attenuation.
    #[serde(default)]
    pub range: Option<f32>,
    #[serde(default = "default_on")]
    pub on: bool,
    /// Direction for directional and spot lights.
    #[serde(default = "down")]
    pub direction: [f32; 3],
    /// Ground color of sky lights.
    #[serde(default)]
    pub ground_color: Color3,
}

fn default_on() -> bool {
    true
}

fn down() -> [f32; 3] {
    [0.0, -1.0, 0.0]
}

impl HostLight {
    pub fn new(node: HostNode, kind: HostLightKind) -> Self {
        Self {
            node,
            kind,
            color: Color3::WHITE,
            intensity: 1.0,
            range: None,
            on: true,
            direction: down(),
            ground_color: Color3::BLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostLightKind {
    Omni,
    Directional,
    /// Cone angles in radians.
    Spot { hotspot: f32, falloff: f32 },
    Sky,
}

/// An atmospheric effect slot of the host environment.
#[derive(Debug, Clone, Deserialize)]
pub struct HostAtmospheric {
    pub class_name: String,
    #[serde(default = "default_on")]
    pub active: bool,
    /// Fog parameters, present when the effect is a standard fog.
    #[serde(default)]
    pub fog: Option<HostFog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostFog {
    pub color: Color3,
    #[serde(default)]
    pub density: f32,
    #[serde(default)]
    pub fog_type: FogType,
    /// Near range as a fraction of the camera range.
    #[serde(default)]
    pub near: f32,
    /// Far range as a fraction of the camera range.
    #[serde(default = "default_level")]
    pub far: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FogType {
    #[default]
    Standard,
    Layered,
}
