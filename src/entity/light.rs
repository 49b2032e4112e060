//! Light export.

use super::{EntityExporter, ExportContext};
use crate::document::{BabylonLight, LightType};
use crate::error::{ExportError, Result};
use crate::host::{HostLight, HostLightKind};
use crate::registry::{EntityKind, IdAllocator};

/// Exports host lights.
#[derive(Debug, Default, Clone, Copy)]
pub struct LightExporter;

impl EntityExporter for LightExporter {
    type Node = HostLight;
    type Output = String;

    const KIND: &'static str = "light";

    fn node_name(node: &HostLight) -> &str {
        &node.node.name
    }

    fn export(&self, light: &HostLight, ctx: &mut ExportContext) -> Result<Option<String>> {
        let node = &light.node;
        if node.is_excluded() {
            return Ok(None);
        }
        if light.intensity < 0.0 {
            return Err(ExportError::entity(
                Self::KIND,
                &node.name,
                format!("negative intensity {}", light.intensity),
            ));
        }

        if let HostLightKind::Spot { hotspot, falloff } = light.kind {
            let valid_cone = falloff > 0.0 && hotspot <= falloff;
            if !valid_cone {
                return Err(ExportError::entity(
                    Self::KIND,
                    &node.name,
                    format!("invalid cone {}..{}", hotspot, falloff),
                ));
            }
        }

        let light_type = match light.kind {
            HostLightKind::Omni => LightType::Point,
            HostLightKind::Directional => LightType::Directional,
            HostLightKind::Spot { .. } => LightType::Spot,
            HostLightKind::Sky => LightType::Hemispheric,
        };

        let id = ctx.ids.next(EntityKind::Light);
        let mut out = BabylonLight::new(id.clone(), node.name.clone(), light_type);
        out.position = node.transform.position;
        out.intensity = light.intensity;
        out.range = light.range;
        out.diffuse = light.color.to_array();
        out.specular = light.color.to_array();
        out.is_enabled = light.on;

        match light.kind {
            HostLightKind::Omni => {}
            HostLightKind::Directional => {
                out.direction = Some(light.direction);
            }
            HostLightKind::Spot { falloff, .. } => {
                out.direction = Some(light.direction);
                out.angle = Some(falloff);
                out.exponent = Some(1.0);
            }
            HostLightKind::Sky => {
                // Hemispheric lights point at the sky.
                out.direction = Some([0.0, 1.0, 0.0]);
                out.ground_color = Some(light.ground_color.to_array());
            }
        }

        ctx.scene.lights.push(out);
        ctx.register_node(node.handle, &id, node.parent);
        Ok(Some(id))
    }
}

/// The light added to scenes that define none.
pub fn default_light(ids: &mut IdAllocator) -> BabylonLight {
    let mut light = BabylonLight::new(ids.next(EntityKind::Light), "Default light", LightType::Hemispheric);
    light.direction = Some([0.0, 1.0, 0.0]);
    light.ground_color = Some([0.0, 0.0, 0.0]);
    light
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::test_support::context;
    use crate::host::HostNode;
    use crate::types::Color3;

    #[test]
    fn test_export_spot_light() {
        let mut ctx = context();
        let mut light = HostLight::new(
            HostNode::new(1, "Spot"),
            HostLightKind::Spot {
                hotspot: 0.4,
                falloff: 0.6,
            },
        );
        light.color = Color3::new(1.0, 0.9, 0.8);
        light.range = Some(50.0);

        LightExporter.export(&light, &mut ctx).unwrap();
        let out = &ctx.scene.lights[0];
        assert_eq!(out.light_type, LightType::Spot);
        assert_eq!(out.angle, Some(0.6));
        assert_eq!(out.direction, Some([0.0, -1.0, 0.0]));
        assert_eq!(out.diffuse, [1.0, 0.9, 0.8]);
        assert_eq!(out.range, Some(50.0));
    }

    #[test]
    fn test_switched_off_light_is_disabled() {
        let mut ctx = context();
        let mut light = HostLight::new(HostNode::new(1, "Off"), HostLightKind::Omni);
        light.on = false;

        LightExporter.export(&light, &mut ctx).unwrap();
        assert!(!ctx.scene.lights[0].is_enabled);
        assert!(ctx.scene.lights[0].direction.is_none());
    }

    #[test]
    fn test_invalid_spot_cone() {
        let mut ctx = context();
        let light = HostLight::new(
            HostNode::new(1, "Bad"),
            HostLightKind::Spot {
                hotspot: 1.0,
                falloff: 0.5,
            },
        );
        assert!(LightExporter.export(&light, &mut ctx).is_err());
        assert!(ctx.scene.lights.is_empty());
    }

    #[test]
    fn test_default_light_is_hemispheric() {
        let mut ids = IdAllocator::new();
        let light = default_light(&mut ids);
        assert_eq!(light.light_type, LightType::Hemispheric);
        assert_eq!(light.name, "Default light");
        assert_eq!(serde_json::to_value(&light).unwrap()["type"], 3);
    }
}
