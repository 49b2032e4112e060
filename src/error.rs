//! Error types for the scene exporter.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for scene export operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The directory that should receive the output does not exist.
    #[error("Output folder does not exist: {0}")]
    OutputDirectoryMissing(PathBuf),

    /// Another export is already running on this exporter.
    #[error("An export is already in progress")]
    ExportInProgress,

    /// Failed to serialize JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or convert an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The host application rejected a request.
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// A single node could not be converted.
    #[error("Cannot export {kind} '{name}': {reason}")]
    Entity {
        kind: &'static str,
        name: String,
        reason: String,
    },

    /// Texture could not be copied to the output folder.
    #[error("Texture error: {0}")]
    Texture(String),

    /// The background writer stopped without reporting a result.
    #[error("Writer thread terminated unexpectedly")]
    WriterPanicked,
}

impl ExportError {
    /// Build a per-entity conversion error.
    pub fn entity(kind: &'static str, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Entity {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Error reported by a [`SceneHost`](crate::host::SceneHost).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Saving the authoring document failed.
    #[error("Failed to save document: {0}")]
    SaveFailed(String),
}
