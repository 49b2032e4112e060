use serde::Serialize;

/// A bitmap texture embedded in a material.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BabylonTexture {
    /// File name relative to the document.
    pub name: String,
    pub level: f32,
    pub has_alpha: bool,
    pub coordinates_mode: u32,
    pub coordinates_index: u32,
    pub u_offset: f32,
    pub v_offset: f32,
    pub u_scale: f32,
    pub v_scale: f32,
    /// 1 = wrap, 0 = clamp.
    pub wrap_u: u32,
    pub wrap_v: u32,
}

/// A standard material.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BabylonMaterial {
    pub name: String,
    pub id: String,
    /// Filled from the scene ambient color at finalization when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambient: Option<[f32; 3]>,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub specular_power: f32,
    pub alpha: f32,
    pub back_face_culling: bool,
    pub wireframe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diffuse_texture: Option<BabylonTexture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambient_texture: Option<BabylonTexture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity_texture: Option<BabylonTexture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection_texture: Option<BabylonTexture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive_texture: Option<BabylonTexture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specular_texture: Option<BabylonTexture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bump_texture: Option<BabylonTexture>,
}

impl BabylonMaterial {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            ambient: None,
            diffuse: [1.0, 1.0, 1.0],
            specular: [0.0, 0.0, 0.0],
            emissive: [0.0, 0.0, 0.0],
            specular_power: 64.0,
            alpha: 1.0,
            back_face_culling: true,
            wireframe: false,
            diffuse_texture: None,
            ambient_texture: None,
            opacity_texture: None,
            reflection_texture: None,
            emissive_texture: None,
            specular_texture: None,
            bump_texture: None,
        }
    }
}

/// A container material whose slots point to standard materials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BabylonMultiMaterial {
    pub name: String,
    pub id: String,
    /// Sub-material ids by slot. Empty slots serialize as null.
    pub materials: Vec<Option<String>>,
}
