//! Skeleton export.
//!
//! Skins are collected while meshes are exported and turned into skeletons
//! once every mesh is done, so bone references never move afterwards.

use super::{EntityExporter, ExportContext};
use crate::document::{BabylonBone, BabylonSkeleton};
use crate::error::{ExportError, Result};
use crate::host::HostSkin;

/// A skin discovered on a mesh, with the skeleton id its meshes point to.
#[derive(Debug, Clone)]
pub struct AccumulatedSkin {
    pub skin: HostSkin,
    pub id: i32,
}

/// Exports accumulated skins as skeletons.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkinExporter;

impl EntityExporter for SkinExporter {
    type Node = AccumulatedSkin;
    type Output = i32;

    const KIND: &'static str = "skeleton";

    fn node_name(node: &AccumulatedSkin) -> &str {
        &node.skin.name
    }

    fn export(&self, accumulated: &AccumulatedSkin, ctx: &mut ExportContext) -> Result<Option<i32>> {
        let skin = &accumulated.skin;
        let mut bones = Vec::with_capacity(skin.bones.len());

        for (index, bone) in skin.bones.iter().enumerate() {
            let parent_bone_index = match bone.parent {
                None => -1,
                Some(parent) if parent < index => parent as i32,
                Some(parent) => {
                    return Err(ExportError::entity(
                        Self::KIND,
                        &skin.name,
                        format!("bone {} has parent {} which does not precede it", bone.name, parent),
                    ));
                }
            };
            bones.push(BabylonBone {
                name: bone.name.clone(),
                index: index as i32,
                parent_bone_index,
                matrix: bone.matrix,
            });
        }

        ctx.scene.skeletons.push(BabylonSkeleton {
            name: skin.name.clone(),
            id: accumulated.id,
            bones,
        });
        Ok(Some(accumulated.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::test_support::context;
    use crate::host::HostBone;
    use crate::types::SkinHandle;

    fn bone(name: &str, parent: Option<usize>) -> HostBone {
        HostBone {
            name: name.to_string(),
            parent,
            matrix: glam::Mat4::from_translation(glam::Vec3::new(0.0, 1.0, 0.0)).to_cols_array(),
        }
    }

    #[test]
    fn test_export_skeleton() {
        let mut ctx = context();
        let skin = AccumulatedSkin {
            skin: HostSkin {
                handle: SkinHandle(1),
                name: "Rig".to_string(),
                bones: vec![bone("hips", None), bone("spine", Some(0)), bone("head", Some(1))],
            },
            id: 4,
        };

        assert_eq!(SkinExporter.export(&skin, &mut ctx).unwrap(), Some(4));
        let skeleton = &ctx.scene.skeletons[0];
        assert_eq!(skeleton.id, 4);
        assert_eq!(skeleton.bones.len(), 3);
        assert_eq!(skeleton.bones[0].parent_bone_index, -1);
        assert_eq!(skeleton.bones[2].parent_bone_index, 1);
        assert_eq!(skeleton.bones[1].matrix[13], 1.0);
    }

    #[test]
    fn test_forward_parent_rejected() {
        let mut ctx = context();
        let skin = AccumulatedSkin {
            skin: HostSkin {
                handle: SkinHandle(1),
                name: "Loop".to_string(),
                bones: vec![bone("a", Some(1)), bone("b", None)],
            },
            id: 0,
        };

        assert!(SkinExporter.export(&skin, &mut ctx).is_err());
        assert!(ctx.scene.skeletons.is_empty());
    }
}
