use serde::Serialize;

/// A range of the index buffer drawn with one material slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BabylonSubMesh {
    pub material_index: u32,
    pub vertices_start: u32,
    pub vertices_count: u32,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BabylonMesh {
    pub name: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
    pub position: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_quaternion: Option<[f32; 4]>,
    pub scaling: [f32; 3],
    pub is_visible: bool,
    pub is_enabled: bool,
    pub pickable: bool,
    pub check_collisions: bool,
    pub billboard_mode: u32,
    pub positions: Vec<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub normals: Vec<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_meshes: Vec<BabylonSubMesh>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skeleton_id: Option<i32>,
    /// Four bone indices per vertex packed into one value, 8 bits each.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matrices_indices: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matrices_weights: Vec<f32>,
}

impl BabylonMesh {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            parent_id: None,
            material_id: None,
            position: [0.0; 3],
            rotation: None,
            rotation_quaternion: None,
            scaling: [1.0, 1.0, 1.0],
            is_visible: true,
            is_enabled: true,
            pickable: true,
            check_collisions: false,
            billboard_mode: 0,
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
            sub_meshes: Vec::new(),
            skeleton_id: None,
            matrices_indices: Vec::new(),
            matrices_weights: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Drop the skin binding and its per-vertex data.
    pub fn clear_skin(&mut self) {
        self.skeleton_id = None;
        self.matrices_indices.clear();
        self.matrices_weights.clear();
    }
}
