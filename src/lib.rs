//! # Babylon Exporter
//!
//! Exports an authoring application's scene to a Babylon scene document.
//!
//! ## Overview
//!
//! The host application is reached through the [`SceneHost`] trait. The
//! exporter walks the scene in a fixed order (cameras, fog, meshes,
//! materials, lights, skeletons), assigns deterministic identifiers,
//! deduplicates shared materials and textures, and writes a JSON document
//! plus an optional offline manifest.
//!
//! ## Quick Start
//!
//! ```ignore
//! use babylon_exporter::{ExportOptions, SceneExporter, SnapshotHost, LogSink};
//!
//! // Load a scene dumped by a host plugin
//! let mut host = SnapshotHost::from_path("scene.json")?;
//!
//! // Export it
//! let exporter = SceneExporter::new(ExportOptions::default().with_manifest(true));
//! let outcome = exporter.export(&mut host, "out/scene.babylon", &mut LogSink, &mut LogSink)?;
//! ```
//!
//! ## Host Integration
//!
//! Plugins implement [`SceneHost`] over their application's scene graph. The
//! exporter only calls the host from the thread that started the export, and
//! calls [`SceneHost::pump_events`] at every cancellation poll point so the
//! application stays responsive. Cancel from another thread through
//! [`SceneExporter::cancellation_token`].

pub mod document;
pub mod entity;
pub mod error;
pub mod export;
pub mod host;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod types;

// Re-export main types for convenience
pub use document::BabylonScene;
pub use error::{ExportError, HostError, Result};
pub use export::{commit, write_document, CommitReport, Manifest};
pub use host::{SceneHost, SnapshotHost};
pub use pipeline::{CancellationToken, ExportOptions, ExportOutcome, ExportSummary, SceneExporter};
pub use report::{DiagnosticsSink, LogSink, MessageColor, NullSink, ProgressSink};
pub use types::{Color3, CoordinateSystem, MaterialHandle, NodeHandle, PropertyValue, RotationMode};
