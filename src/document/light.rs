use serde::{Serialize, Serializer};

/// Light types, serialized as the runtime's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Point,
    Directional,
    Spot,
    Hemispheric,
}

impl LightType {
    pub fn code(self) -> u32 {
        match self {
            LightType::Point => 0,
            LightType::Directional => 1,
            LightType::Spot => 2,
            LightType::Hemispheric => 3,
        }
    }
}

impl Serialize for LightType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BabylonLight {
    pub name: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub light_type: LightType,
    pub position: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<[f32; 3]>,
    /// Cone angle of spot lights, in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exponent: Option<f32>,
    pub intensity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<f32>,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_color: Option<[f32; 3]>,
    pub is_enabled: bool,
}

impl BabylonLight {
    pub fn new(id: impl Into<String>, name: impl Into<String>, light_type: LightType) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            parent_id: None,
            light_type,
            position: [0.0; 3],
            direction: None,
            angle: None,
            exponent: None,
            intensity: 1.0,
            range: None,
            diffuse: [1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0],
            ground_color: None,
            is_enabled: true,
        }
    }
}
