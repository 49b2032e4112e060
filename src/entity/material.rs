//! Material export.

use super::texture::export_texture;
use super::{EntityExporter, ExportContext};
use crate::document::{BabylonMaterial, BabylonMultiMaterial};
use crate::error::Result;
use crate::host::{HostMaterial, HostMaterialKind, StandardMaterial};

/// A material taken from the registry queue, with the id it was given when
/// first referenced.
#[derive(Debug, Clone)]
pub struct QueuedMaterial {
    pub material: HostMaterial,
    pub id: String,
}

/// Exports queued materials.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialExporter;

impl EntityExporter for MaterialExporter {
    type Node = QueuedMaterial;
    type Output = String;

    const KIND: &'static str = "material";

    fn node_name(node: &QueuedMaterial) -> &str {
        &node.material.name
    }

    fn export(&self, queued: &QueuedMaterial, ctx: &mut ExportContext) -> Result<Option<String>> {
        let material = &queued.material;
        match &material.kind {
            HostMaterialKind::Standard(standard) => {
                let out = standard_material(&queued.id, &material.name, standard, ctx);
                ctx.scene.materials.push(out);
            }
            HostMaterialKind::Multi { sub_materials } => {
                // Sub-materials go through the registry like any other
                // reference, so they are emitted once even when shared.
                let materials = sub_materials
                    .iter()
                    .map(|slot| slot.map(|handle| ctx.materials.reference(handle, &mut ctx.ids)))
                    .collect();
                ctx.scene.multi_materials.push(BabylonMultiMaterial {
                    name: material.name.clone(),
                    id: queued.id.clone(),
                    materials,
                });
            }
        }
        ctx.materials.mark_emitted(material.handle);
        Ok(Some(queued.id.clone()))
    }
}

fn standard_material(
    id: &str,
    name: &str,
    standard: &StandardMaterial,
    ctx: &mut ExportContext,
) -> BabylonMaterial {
    let mut out = BabylonMaterial::new(id, name);
    out.ambient = standard.ambient.map(|c| c.to_array());
    out.diffuse = standard.diffuse.to_array();
    out.specular = standard.specular.to_array();
    out.emissive = standard.emissive.to_array();
    out.specular_power = standard.specular_power;
    out.alpha = standard.alpha.clamp(0.0, 1.0);
    out.back_face_culling = !standard.two_sided;
    out.wireframe = standard.wireframe;

    let slots = &standard.textures;
    out.diffuse_texture = slots.diffuse.as_ref().and_then(|t| export_texture(t, ctx));
    out.ambient_texture = slots.ambient.as_ref().and_then(|t| export_texture(t, ctx));
    out.opacity_texture = slots.opacity.as_ref().and_then(|t| export_texture(t, ctx));
    out.reflection_texture = slots.reflection.as_ref().and_then(|t| export_texture(t, ctx));
    out.emissive_texture = slots.emissive.as_ref().and_then(|t| export_texture(t, ctx));
    out.specular_texture = slots.specular.as_ref().and_then(|t| export_texture(t, ctx));
    out.bump_texture = slots.bump.as_ref().and_then(|t| export_texture(t, ctx));
    out
}
