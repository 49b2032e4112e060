use serde::Serialize;

/// A free camera.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BabylonCamera {
    pub name: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub camera_type: String,
    pub position: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_quaternion: Option<[f32; 4]>,
    pub fov: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub speed: f32,
    pub inertia: f32,
    pub check_collisions: bool,
    pub apply_gravity: bool,
    pub ellipsoid: [f32; 3],
}

impl BabylonCamera {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            parent_id: None,
            camera_type: "FreeCamera".to_string(),
            position: [0.0; 3],
            target: None,
            rotation: None,
            rotation_quaternion: None,
            fov: 0.8,
            min_z: 1.0,
            max_z: 10000.0,
            speed: 1.0,
            inertia: 0.9,
            check_collisions: false,
            apply_gravity: false,
            ellipsoid: [0.5, 1.0, 0.5],
        }
    }
}
