//! Camera export.

use super::{rotation_fields, EntityExporter, ExportContext};
use crate::document::BabylonCamera;
use crate::error::{ExportError, Result};
use crate::host::HostCamera;
use crate::registry::EntityKind;

/// Exports host cameras as free cameras.
#[derive(Debug, Default, Clone, Copy)]
pub struct CameraExporter;

impl EntityExporter for CameraExporter {
    type Node = HostCamera;
    type Output = String;

    const KIND: &'static str = "camera";

    fn node_name(node: &HostCamera) -> &str {
        &node.node.name
    }

    fn export(&self, camera: &HostCamera, ctx: &mut ExportContext) -> Result<Option<String>> {
        let node = &camera.node;
        if node.is_excluded() {
            return Ok(None);
        }

        let valid_range = camera.near > 0.0 && camera.far > camera.near;
        if !valid_range {
            return Err(ExportError::entity(
                Self::KIND,
                &node.name,
                format!("invalid clipping range {}..{}", camera.near, camera.far),
            ));
        }
        let valid_fov = camera.fov > 0.0 && camera.fov < std::f32::consts::PI;
        if !valid_fov {
            return Err(ExportError::entity(
                Self::KIND,
                &node.name,
                format!("invalid field of view {}", camera.fov),
            ));
        }

        let id = ctx.ids.next(EntityKind::Camera);
        let mut out = BabylonCamera::new(id.clone(), node.name.clone());
        out.position = node.transform.position;
        out.target = camera.target;
        // A target fully defines the orientation.
        if camera.target.is_none() {
            let (rotation, quaternion) = rotation_fields(&node.transform, ctx.rotation_mode());
            out.rotation = rotation;
            out.rotation_quaternion = quaternion;
        }
        out.fov = camera.fov;
        out.min_z = camera.near;
        out.max_z = camera.far;
        out.speed = node.f32_property("babylonjs_speed", 1.0);
        out.inertia = node.f32_property("babylonjs_inertia", 0.9);
        out.check_collisions = node.bool_property("babylonjs_checkcollisions", false);
        out.apply_gravity = node.bool_property("babylonjs_applygravity", false);

        ctx.scene.cameras.push(out);
        ctx.register_node(node.handle, &id, node.parent);
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::test_support::context;
    use crate::host::{HostNode, NO_EXPORT_PROPERTY};
    use crate::types::{PropertyValue, RotationMode};

    #[test]
    fn test_export_camera() {
        let mut ctx = context();
        let mut camera = HostCamera::new(HostNode::new(1, "Main"));
        camera.near = 0.1;
        camera.far = 500.0;
        camera.node.transform.position = [0.0, 5.0, -10.0];

        let id = CameraExporter.export(&camera, &mut ctx).unwrap();
        assert_eq!(id.as_deref(), Some("camera-0001"));

        let out = &ctx.scene.cameras[0];
        assert_eq!(out.name, "Main");
        assert_eq!(out.min_z, 0.1);
        assert_eq!(out.max_z, 500.0);
        assert_eq!(out.position, [0.0, 5.0, -10.0]);
        assert_eq!(out.rotation_quaternion, Some([0.0, 0.0, 0.0, 1.0]));
        assert!(out.rotation.is_none());
    }

    #[test]
    fn test_euler_mode_and_target() {
        let mut ctx = context();
        ctx.scene.rotation_mode = RotationMode::Euler;

        let free = HostCamera::new(HostNode::new(1, "Free"));
        CameraExporter.export(&free, &mut ctx).unwrap();
        assert_eq!(ctx.scene.cameras[0].rotation, Some([0.0, 0.0, 0.0]));

        let mut targeted = HostCamera::new(HostNode::new(2, "Targeted"));
        targeted.target = Some([0.0, 0.0, 0.0]);
        CameraExporter.export(&targeted, &mut ctx).unwrap();
        assert!(ctx.scene.cameras[1].rotation.is_none());
        assert_eq!(ctx.scene.cameras[1].target, Some([0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_excluded_camera_is_skipped() {
        let mut ctx = context();
        let mut camera = HostCamera::new(HostNode::new(1, "Hidden"));
        camera
            .node
            .properties
            .insert(NO_EXPORT_PROPERTY.to_string(), PropertyValue::Bool(true));

        assert!(CameraExporter.export(&camera, &mut ctx).unwrap().is_none());
        assert!(ctx.scene.cameras.is_empty());
    }

    #[test]
    fn test_invalid_clipping_range() {
        let mut ctx = context();
        let mut camera = HostCamera::new(HostNode::new(1, "Broken"));
        camera.near = 10.0;
        camera.far = 1.0;

        let err = CameraExporter.export(&camera, &mut ctx).unwrap_err();
        assert!(matches!(err, ExportError::Entity { kind: "camera", .. }));
        assert!(ctx.scene.cameras.is_empty());
    }
}
