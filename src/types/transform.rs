//! Node transforms and rotation representation.

use glam::{EulerRot, Quat};
use serde::{Deserialize, Serialize};

/// Local transform of a host node, already in the export coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    #[serde(default)]
    pub position: [f32; 3],
    /// Rotation quaternion as (x, y, z, w).
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "unit_scaling")]
    pub scaling: [f32; 3],
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scaling() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: identity_rotation(),
            scaling: unit_scaling(),
        }
    }
}

/// How rotations are written to the document, chosen once per scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    Quaternion,
    Euler,
}

impl NodeTransform {
    pub fn quaternion(&self) -> Quat {
        let [x, y, z, w] = self.rotation;
        Quat::from_xyzw(x, y, z, w).normalize()
    }

    /// Euler angles in radians as (x, y, z), applied in Y, X, Z order as the
    /// runtime expects.
    pub fn euler_angles(&self) -> [f32; 3] {
        let (y, x, z) = self.quaternion().to_euler(EulerRot::YXZ);
        [x, y, z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_euler() {
        let t = NodeTransform::default();
        assert_eq!(t.euler_angles(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_yaw_euler() {
        let q = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let t = NodeTransform {
            rotation: [q.x, q.y, q.z, q.w],
            ..NodeTransform::default()
        };
        let [x, y, z] = t.euler_angles();
        assert!(x.abs() < 1e-5);
        assert!((y - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!(z.abs() < 1e-5);
    }
}
