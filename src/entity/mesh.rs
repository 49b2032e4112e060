//! Mesh export.
//!
//! Besides geometry, a mesh is where shared resources are discovered: its
//! material goes to the material registry and its skin to the skin
//! accumulator. Neither is exported here.

use super::{rotation_fields, EntityExporter, ExportContext};
use crate::document::{BabylonMesh, BabylonSubMesh};
use crate::error::{ExportError, Result};
use crate::host::{HostGeometry, HostMesh, HostSkinBinding};
use crate::registry::EntityKind;

/// Exports host meshes.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeshExporter;

impl EntityExporter for MeshExporter {
    type Node = HostMesh;
    type Output = String;

    const KIND: &'static str = "mesh";

    fn node_name(node: &HostMesh) -> &str {
        &node.node.name
    }

    fn export(&self, mesh: &HostMesh, ctx: &mut ExportContext) -> Result<Option<String>> {
        let node = &mesh.node;
        if node.is_excluded() {
            return Ok(None);
        }
        if node.hidden && !ctx.options.export_hidden_objects {
            log::debug!("skipping hidden mesh {}", node.name);
            return Ok(None);
        }

        validate_geometry(&mesh.geometry)
            .map_err(|reason| ExportError::entity(Self::KIND, &node.name, reason))?;
        if let Some(binding) = &mesh.skin {
            validate_skin(binding, mesh.geometry.positions.len())
                .map_err(|reason| ExportError::entity(Self::KIND, &node.name, reason))?;
        }

        let id = ctx.ids.next(EntityKind::Mesh);
        let mut out = BabylonMesh::new(id.clone(), node.name.clone());

        out.position = node.transform.position;
        out.scaling = node.transform.scaling;
        let (rotation, quaternion) = rotation_fields(&node.transform, ctx.rotation_mode());
        out.rotation = rotation;
        out.rotation_quaternion = quaternion;
        out.is_visible = !node.hidden;
        out.check_collisions = node.bool_property("babylonjs_checkcollisions", false);
        out.pickable = node.bool_property("babylonjs_pickable", true);

        let geometry = &mesh.geometry;
        out.positions = geometry.positions.iter().flatten().copied().collect();
        out.normals = geometry.normals.iter().flatten().copied().collect();
        out.uvs = geometry.uvs.iter().flatten().copied().collect();
        out.indices = geometry.indices.clone();
        out.sub_meshes.push(BabylonSubMesh {
            material_index: 0,
            vertices_start: 0,
            vertices_count: geometry.positions.len() as u32,
            index_start: 0,
            index_count: geometry.indices.len() as u32,
        });

        if let Some(handle) = mesh.material {
            out.material_id = Some(ctx.materials.reference(handle, &mut ctx.ids));
        }

        if let Some(binding) = &mesh.skin {
            out.skeleton_id = Some(ctx.skins.bind(&binding.skin, &mut ctx.ids));
            out.matrices_indices = binding.bone_indices.iter().map(|i| pack_bone_indices(*i)).collect();
            out.matrices_weights = binding.bone_weights.iter().flatten().copied().collect();
        }

        ctx.scene.meshes.push(out);
        ctx.register_node(node.handle, &id, node.parent);
        Ok(Some(id))
    }
}

fn validate_geometry(geometry: &HostGeometry) -> std::result::Result<(), String> {
    let vertex_count = geometry.positions.len();
    if vertex_count == 0 {
        return Err("mesh has no vertices".to_string());
    }
    if geometry.indices.len() % 3 != 0 {
        return Err(format!(
            "index count {} is not a multiple of 3",
            geometry.indices.len()
        ));
    }
    if let Some(index) = geometry.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(format!(
            "index {} out of range for {} vertices",
            index, vertex_count
        ));
    }
    if !geometry.normals.is_empty() && geometry.normals.len() != vertex_count {
        return Err(format!(
            "{} normals for {} vertices",
            geometry.normals.len(),
            vertex_count
        ));
    }
    if !geometry.uvs.is_empty() && geometry.uvs.len() != vertex_count {
        return Err(format!("{} uvs for {} vertices", geometry.uvs.len(), vertex_count));
    }
    Ok(())
}

fn validate_skin(binding: &HostSkinBinding, vertex_count: usize) -> std::result::Result<(), String> {
    if binding.bone_indices.len() != vertex_count || binding.bone_weights.len() != vertex_count {
        return Err(format!(
            "skin data covers {}/{} vertices, mesh has {}",
            binding.bone_indices.len(),
            binding.bone_weights.len(),
            vertex_count
        ));
    }
    let bone_count = binding.skin.bones.len();
    // Indices are packed into 8 bits each.
    if bone_count > 256 {
        return Err(format!("skin {} has {} bones, at most 256 are supported", binding.skin.name, bone_count));
    }
    if let Some(index) = binding
        .bone_indices
        .iter()
        .flatten()
        .find(|&&i| i as usize >= bone_count)
    {
        return Err(format!("bone index {} out of range for {} bones", index, bone_count));
    }
    Ok(())
}

/// Pack four 8-bit bone indices into one value, first index in the low byte.
fn pack_bone_indices(indices: [u32; 4]) -> u32 {
    indices[0] | (indices[1] << 8) | (indices[2] << 16) | (indices[3] << 24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::test_support::context;
    use crate::host::{HostBone, HostNode, HostSkin};
    use crate::registry::MaterialStatus;
    use crate::types::{MaterialHandle, SkinHandle};

    fn triangle() -> HostGeometry {
        HostGeometry {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            indices: vec![0, 1, 2],
        }
    }

    fn skin(handle: u64) -> HostSkinBinding {
        HostSkinBinding {
            skin: HostSkin {
                handle: SkinHandle(handle),
                name: "Rig".to_string(),
                bones: vec![
                    HostBone {
                        name: "root".to_string(),
                        parent: None,
                        matrix: glam::Mat4::IDENTITY.to_cols_array(),
                    },
                    HostBone {
                        name: "arm".to_string(),
                        parent: Some(0),
                        matrix: glam::Mat4::IDENTITY.to_cols_array(),
                    },
                ],
            },
            bone_indices: vec![[0, 1, 0, 0]; 3],
            bone_weights: vec![[0.5, 0.5, 0.0, 0.0]; 3],
        }
    }

    #[test]
    fn test_export_mesh_geometry() {
        let mut ctx = context();
        let mesh = HostMesh::new(HostNode::new(1, "Tri"), triangle());

        let id = MeshExporter.export(&mesh, &mut ctx).unwrap().unwrap();
        let out = &ctx.scene.meshes[0];
        assert_eq!(out.id, id);
        assert_eq!(out.vertex_count(), 3);
        assert_eq!(out.positions.len(), 9);
        assert_eq!(out.uvs.len(), 6);
        assert_eq!(out.indices, vec![0, 1, 2]);
        assert_eq!(out.sub_meshes[0].index_count, 3);
        assert!(out.material_id.is_none());
    }

    #[test]
    fn test_shared_material_gets_one_id() {
        let mut ctx = context();
        let mut a = HostMesh::new(HostNode::new(1, "A"), triangle());
        let mut b = HostMesh::new(HostNode::new(2, "B"), triangle());
        a.material = Some(MaterialHandle(5));
        b.material = Some(MaterialHandle(5));

        MeshExporter.export(&a, &mut ctx).unwrap();
        MeshExporter.export(&b, &mut ctx).unwrap();

        assert_eq!(ctx.scene.meshes[0].material_id, ctx.scene.meshes[1].material_id);
        assert_eq!(ctx.materials.len(), 1);
        assert_eq!(ctx.materials.status(MaterialHandle(5)), Some(MaterialStatus::Queued));
        // Materials are queued, not exported.
        assert!(ctx.scene.materials.is_empty());
    }

    #[test]
    fn test_skin_is_accumulated_not_exported() {
        let mut ctx = context();
        let mut mesh = HostMesh::new(HostNode::new(1, "Body"), triangle());
        mesh.skin = Some(skin(9));

        MeshExporter.export(&mesh, &mut ctx).unwrap();
        let out = &ctx.scene.meshes[0];
        assert_eq!(out.skeleton_id, Some(0));
        assert_eq!(out.matrices_indices, vec![0x0000_0100; 3]);
        assert_eq!(out.matrices_weights.len(), 12);
        assert_eq!(ctx.skins.len(), 1);
        assert!(ctx.scene.skeletons.is_empty());
    }

    #[test]
    fn test_hidden_mesh_skipped_unless_requested() {
        let mut ctx = context();
        let mut mesh = HostMesh::new(HostNode::new(1, "Ghost"), triangle());
        mesh.node.hidden = true;

        assert!(MeshExporter.export(&mesh, &mut ctx).unwrap().is_none());

        ctx.options.export_hidden_objects = true;
        assert!(MeshExporter.export(&mesh, &mut ctx).unwrap().is_some());
        assert!(!ctx.scene.meshes[0].is_visible);
    }

    #[test]
    fn test_invalid_geometry_is_rejected_before_registration() {
        let mut ctx = context();
        let mut geometry = triangle();
        geometry.indices = vec![0, 1, 7];
        let mut mesh = HostMesh::new(HostNode::new(1, "Bad"), geometry);
        mesh.material = Some(MaterialHandle(1));

        assert!(MeshExporter.export(&mesh, &mut ctx).is_err());
        assert!(ctx.scene.meshes.is_empty());
        assert!(ctx.materials.is_empty());
    }

    #[test]
    fn test_skin_bone_index_out_of_range() {
        let mut ctx = context();
        let mut binding = skin(1);
        binding.bone_indices[2] = [0, 5, 0, 0];
        let mut mesh = HostMesh::new(HostNode::new(1, "Body"), triangle());
        mesh.skin = Some(binding);

        let err = MeshExporter.export(&mesh, &mut ctx).unwrap_err();
        assert!(err.to_string().contains("bone index 5"));
        assert!(ctx.skins.is_empty());
    }

    #[test]
    fn test_pack_bone_indices() {
        assert_eq!(pack_bone_indices([1, 2, 3, 4]), 0x0403_0201);
    }
}
