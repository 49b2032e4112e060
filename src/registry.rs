//! Per-export deduplication state and identifier allocation.
//!
//! Everything here lives for exactly one export run.

use crate::host::HostSkin;
use crate::types::MaterialHandle;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Kinds of entity that receive a string identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Camera,
    Mesh,
    Material,
    Light,
}

impl EntityKind {
    fn prefix(self) -> &'static str {
        match self {
            EntityKind::Camera => "camera",
            EntityKind::Mesh => "mesh",
            EntityKind::Material => "material",
            EntityKind::Light => "light",
        }
    }
}

/// Hands out identifiers in traversal order, so an unchanged scene always
/// gets the same identifiers.
#[derive(Debug, Default)]
pub struct IdAllocator {
    counters: HashMap<EntityKind, u32>,
    next_skeleton: i32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, kind: EntityKind) -> String {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        format!("{}-{:04}", kind.prefix(), counter)
    }

    pub fn next_skeleton(&mut self) -> i32 {
        let id = self.next_skeleton;
        self.next_skeleton += 1;
        id
    }
}

/// Export status of a registered material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialStatus {
    /// Referenced and waiting for the drain.
    Queued,
    /// Written to the document.
    Emitted,
    /// Never written: the drain ran out of passes or the material failed.
    Abandoned,
}

#[derive(Debug)]
struct MaterialEntry {
    handle: MaterialHandle,
    id: String,
    status: MaterialStatus,
}

/// Tracks every host material referenced during an export.
///
/// A material gets its output id the first time it is referenced and is queued
/// once; later references reuse the id.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    entries: Vec<MaterialEntry>,
    index: HashMap<MaterialHandle, usize>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output id for `handle`, queuing the material if it was never seen.
    pub fn reference(&mut self, handle: MaterialHandle, ids: &mut IdAllocator) -> String {
        if let Some(&i) = self.index.get(&handle) {
            return self.entries[i].id.clone();
        }
        let id = ids.next(EntityKind::Material);
        self.index.insert(handle, self.entries.len());
        self.entries.push(MaterialEntry {
            handle,
            id: id.clone(),
            status: MaterialStatus::Queued,
        });
        id
    }

    pub fn status(&self, handle: MaterialHandle) -> Option<MaterialStatus> {
        self.index.get(&handle).map(|&i| self.entries[i].status)
    }

    /// Snapshot of the queued materials in reference order. Materials
    /// referenced after the snapshot is taken are not part of it.
    pub fn pending(&self) -> Vec<(MaterialHandle, String)> {
        self.entries
            .iter()
            .filter(|e| e.status == MaterialStatus::Queued)
            .map(|e| (e.handle, e.id.clone()))
            .collect()
    }

    pub fn mark_emitted(&mut self, handle: MaterialHandle) {
        self.set_status(handle, MaterialStatus::Emitted);
    }

    pub fn mark_abandoned(&mut self, handle: MaterialHandle) {
        self.set_status(handle, MaterialStatus::Abandoned);
    }

    /// Abandon everything still queued and return it.
    pub fn abandon_pending(&mut self) -> Vec<(MaterialHandle, String)> {
        let pending = self.pending();
        for (handle, _) in &pending {
            self.mark_abandoned(*handle);
        }
        pending
    }

    /// True when no material is waiting to be exported.
    pub fn is_drained(&self) -> bool {
        self.entries.iter().all(|e| e.status != MaterialStatus::Queued)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set_status(&mut self, handle: MaterialHandle, status: MaterialStatus) {
        if let Some(&i) = self.index.get(&handle) {
            self.entries[i].status = status;
        }
    }
}

/// What happened to a texture file the first time it was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    /// File name the document refers to.
    pub output_name: String,
    pub has_alpha: bool,
}

/// Outcome of the first sighting of a texture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureStatus {
    Exported(TextureRecord),
    /// The file could not be used. Already reported.
    Failed,
}

/// Texture files already handled during this export, keyed by source path,
/// plus which source path claimed each output file name.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    seen: HashMap<PathBuf, TextureStatus>,
    names: HashMap<String, PathBuf>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&TextureStatus> {
        self.seen.get(path)
    }

    /// Record `path`. Returns `false` if it was already recorded, in which case
    /// the existing record is kept.
    pub fn insert(&mut self, path: &Path, record: TextureRecord) -> bool {
        if self.seen.contains_key(path) {
            return false;
        }
        self.names
            .entry(record.output_name.clone())
            .or_insert_with(|| path.to_path_buf());
        self.seen.insert(path.to_path_buf(), TextureStatus::Exported(record));
        true
    }

    /// Remember that `path` could not be used so it is not retried.
    pub fn mark_failed(&mut self, path: &Path) {
        self.seen
            .entry(path.to_path_buf())
            .or_insert(TextureStatus::Failed);
    }

    /// Source path that already uses `output_name`, if any.
    pub fn claimant(&self, output_name: &str) -> Option<&Path> {
        self.names.get(output_name).map(PathBuf::as_path)
    }

    /// `output_name`, or `stem_N.ext` with the lowest N no source claims.
    pub fn unique_name(&self, output_name: &str) -> String {
        if !self.names.contains_key(output_name) {
            return output_name.to_string();
        }
        let name = Path::new(output_name);
        let stem = name
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = name.extension().map(|e| e.to_string_lossy().into_owned());
        (1..)
            .map(|n| match &extension {
                Some(ext) => format!("{}_{}.{}", stem, n, ext),
                None => format!("{}_{}", stem, n),
            })
            .find(|candidate| !self.names.contains_key(candidate))
            .unwrap_or_else(|| output_name.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Skins discovered while exporting meshes, exported after all meshes.
#[derive(Debug, Default)]
pub struct SkinAccumulator {
    skins: Vec<(HostSkin, i32)>,
}

impl SkinAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skeleton id for `skin`, recording the skin on first sight.
    pub fn bind(&mut self, skin: &HostSkin, ids: &mut IdAllocator) -> i32 {
        if let Some((_, id)) = self.skins.iter().find(|(s, _)| s.handle == skin.handle) {
            return *id;
        }
        let id = ids.next_skeleton();
        self.skins.push((skin.clone(), id));
        id
    }

    /// Take every accumulated skin, in discovery order.
    pub fn take(&mut self) -> Vec<(HostSkin, i32)> {
        std::mem::take(&mut self.skins)
    }

    pub fn len(&self) -> usize {
        self.skins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SkinHandle;

    #[test]
    fn test_ids_are_sequential_per_kind() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next(EntityKind::Camera), "camera-0001");
        assert_eq!(ids.next(EntityKind::Mesh), "mesh-0001");
        assert_eq!(ids.next(EntityKind::Camera), "camera-0002");
        assert_eq!(ids.next_skeleton(), 0);
        assert_eq!(ids.next_skeleton(), 1);
    }

    #[test]
    fn test_material_referenced_twice_is_queued_once() {
        let mut ids = IdAllocator::new();
        let mut registry = MaterialRegistry::new();

        let a = registry.reference(MaterialHandle(7), &mut ids);
        let b = registry.reference(MaterialHandle(7), &mut ids);
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.pending().len(), 1);
        assert_eq!(registry.status(MaterialHandle(7)), Some(MaterialStatus::Queued));
    }

    #[test]
    fn test_pending_is_a_snapshot() {
        let mut ids = IdAllocator::new();
        let mut registry = MaterialRegistry::new();
        registry.reference(MaterialHandle(1), &mut ids);

        let snapshot = registry.pending();
        registry.reference(MaterialHandle(2), &mut ids);
        assert_eq!(snapshot.len(), 1);

        registry.mark_emitted(MaterialHandle(1));
        assert!(!registry.is_drained());
        assert_eq!(registry.pending(), vec![(MaterialHandle(2), "material-0002".to_string())]);

        let abandoned = registry.abandon_pending();
        assert_eq!(abandoned.len(), 1);
        assert!(registry.is_drained());
        assert_eq!(registry.status(MaterialHandle(2)), Some(MaterialStatus::Abandoned));
    }

    #[test]
    fn test_texture_recorded_once() {
        let record = |name: &str| TextureRecord {
            output_name: name.to_string(),
            has_alpha: false,
        };
        let mut textures = TextureRegistry::new();
        assert!(textures.insert(Path::new("maps/wood.png"), record("wood.png")));
        assert!(!textures.insert(Path::new("maps/wood.png"), record("other.png")));
        assert!(textures.insert(Path::new("maps/stone.png"), record("stone.png")));
        assert_eq!(textures.len(), 2);
        assert_eq!(
            textures.get(Path::new("maps/wood.png")),
            Some(&TextureStatus::Exported(record("wood.png")))
        );

        textures.mark_failed(Path::new("maps/missing.png"));
        assert_eq!(textures.get(Path::new("maps/missing.png")), Some(&TextureStatus::Failed));
    }

    #[test]
    fn test_unique_texture_names() {
        let record = |name: &str| TextureRecord {
            output_name: name.to_string(),
            has_alpha: false,
        };
        let mut textures = TextureRegistry::new();
        assert_eq!(textures.unique_name("wood.png"), "wood.png");

        textures.insert(Path::new("a/wood.png"), record("wood.png"));
        assert_eq!(textures.claimant("wood.png"), Some(Path::new("a/wood.png")));
        assert_eq!(textures.unique_name("wood.png"), "wood_1.png");

        textures.insert(Path::new("b/wood.png"), record("wood_1.png"));
        assert_eq!(textures.unique_name("wood.png"), "wood_2.png");
        assert_eq!(textures.unique_name("bark"), "bark");
    }

    #[test]
    fn test_skin_bound_once() {
        let skin = |handle| HostSkin {
            handle: SkinHandle(handle),
            name: format!("skin{}", handle),
            bones: Vec::new(),
        };
        let mut ids = IdAllocator::new();
        let mut skins = SkinAccumulator::new();
        assert_eq!(skins.bind(&skin(3), &mut ids), 0);
        assert_eq!(skins.bind(&skin(3), &mut ids), 0);
        assert_eq!(skins.bind(&skin(4), &mut ids), 1);
        assert_eq!(skins.len(), 2);

        let taken = skins.take();
        assert_eq!(taken[1].0.name, "skin4");
        assert!(skins.is_empty());
    }
}
