use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BabylonBone {
    pub name: String,
    pub index: i32,
    /// -1 for root bones.
    pub parent_bone_index: i32,
    pub matrix: [f32; 16],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BabylonSkeleton {
    pub name: String,
    pub id: i32,
    pub bones: Vec<BabylonBone>,
}
