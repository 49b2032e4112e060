//! Serialization and commit.
//!
//! The finished document is rendered and written on a dedicated writer thread
//! so the caller's thread stays free to service host events. Nothing in here
//! reads host data.

pub mod json;
pub mod manifest;

pub use json::{to_json_bytes, write_document};
pub use manifest::{manifest_path, write_manifest, Manifest};

use crate::document::BabylonScene;
use crate::error::{ExportError, Result};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// What a successful commit wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub document_path: PathBuf,
    pub bytes_written: usize,
    pub manifest_path: Option<PathBuf>,
}

/// Write the document, then the manifest if requested.
///
/// The manifest is only written once the document write succeeded, so its
/// presence marks a complete export.
pub fn commit(scene: &BabylonScene, output_file: &Path, generate_manifest: bool) -> Result<CommitReport> {
    let bytes_written = write_document(scene, output_file)?;
    let manifest_path = if generate_manifest {
        Some(write_manifest(output_file, &Manifest::default())?)
    } else {
        None
    };

    Ok(CommitReport {
        document_path: output_file.to_path_buf(),
        bytes_written,
        manifest_path,
    })
}

/// A commit running on the writer thread.
#[derive(Debug)]
pub struct CommitHandle {
    handle: JoinHandle<Result<CommitReport>>,
}

impl CommitHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the writer thread and return its result.
    pub fn join(self) -> Result<CommitReport> {
        self.handle.join().map_err(|_| ExportError::WriterPanicked)?
    }
}

/// Move `scene` to a writer thread and commit it there.
pub fn spawn_commit(scene: BabylonScene, output_file: PathBuf, generate_manifest: bool) -> Result<CommitHandle> {
    let handle = thread::Builder::new()
        .name("scene-writer".to_string())
        .spawn(move || commit(&scene, &output_file, generate_manifest))?;
    Ok(CommitHandle { handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_with_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("scene.babylon");
        let scene = BabylonScene::new(dir.path());

        let report = commit(&scene, &output, true).unwrap();
        assert!(output.is_file());
        assert_eq!(report.bytes_written as u64, std::fs::metadata(&output).unwrap().len());
        assert_eq!(report.manifest_path, Some(dir.path().join("scene.babylon.manifest")));
    }

    #[test]
    fn test_failed_document_write_skips_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("scene.babylon");
        let scene = BabylonScene::new(dir.path());

        assert!(commit(&scene, &output, true).is_err());
        assert!(!manifest_path(&output).exists());
    }

    #[test]
    fn test_spawned_commit() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("scene.babylon");
        let handle = spawn_commit(BabylonScene::new(dir.path()), output.clone(), false).unwrap();

        let report = handle.join().unwrap();
        assert_eq!(report.document_path, output);
        assert!(report.manifest_path.is_none());
        assert!(output.is_file());
    }
}
