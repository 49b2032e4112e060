//! Shared types used throughout the library.

mod transform;

pub use transform::{NodeTransform, RotationMode};

use serde::{Deserialize, Serialize};

/// Opaque handle to a host scene node.
///
/// Host handles are only meaningful inside one host session and never appear
/// in the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeHandle(pub u64);

/// Opaque handle to a host material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialHandle(pub u64);

/// Opaque handle to a host skin modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkinHandle(pub u64);

/// An RGB color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Color3 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color3 {
    pub const BLACK: Color3 = Color3::new(0.0, 0.0, 0.0);
    pub const WHITE: Color3 = Color3::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Color3 {
    fn from(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<Color3> for [f32; 3] {
    fn from(c: Color3) -> Self {
        c.to_array()
    }
}

/// Handedness and up axis the host converts node data into.
///
/// Must be fixed once per export before any node is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    /// Left-handed, Y up (Direct3D convention, used by the runtime).
    #[default]
    LeftHandedYUp,
    /// Right-handed, Z up (typical authoring tool convention).
    RightHandedZUp,
}

/// A custom property attached to the scene root or a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Vector3([f32; 3]),
    Text(String),
}

impl PropertyValue {
    /// Interpret as a flag. Numbers are true when non-zero, mirroring how
    /// authoring tools store checkboxes as integers.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::Number(n) => Some(*n != 0.0),
            PropertyValue::Text(s) => match s.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            PropertyValue::Vector3(_) => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            PropertyValue::Number(n) => Some(*n as f32),
            PropertyValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_vector3(&self) -> Option<[f32; 3]> {
        match self {
            PropertyValue::Vector3(v) => Some(*v),
            _ => None,
        }
    }
}
