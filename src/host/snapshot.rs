//! In-memory host loaded from a JSON scene snapshot.
//!
//! Used by the command line tool and the test suite. A snapshot is a plain
//! description of a scene graph that a host plugin (or a test) dumped ahead of
//! time.

use super::{HostAtmospheric, HostCamera, HostLight, HostMaterial, HostMesh, SceneHost};
use crate::error::{ExportError, HostError, Result};
use crate::types::{Color3, CoordinateSystem, MaterialHandle, PropertyValue};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A scene held entirely in memory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotHost {
    #[serde(default)]
    pub document_name: Option<String>,
    #[serde(default)]
    pub background_color: Color3,
    #[serde(default)]
    pub ambient_color: Color3,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
    #[serde(default)]
    pub cameras: Vec<HostCamera>,
    #[serde(default)]
    pub meshes: Vec<HostMesh>,
    #[serde(default)]
    pub lights: Vec<HostLight>,
    #[serde(default)]
    pub materials: Vec<HostMaterial>,
    #[serde(default)]
    pub atmospherics: Vec<HostAtmospheric>,
    /// Simulate a failing document save.
    #[serde(default)]
    pub fail_save: bool,

    #[serde(skip)]
    pub(crate) session: SessionState,
}

/// What the exporter did to the host during the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub coordinate_system: Option<CoordinateSystem>,
    pub selection_only: bool,
    pub initialised: bool,
    pub saves: usize,
    pub events_pumped: usize,
}

impl SnapshotHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ExportError::from)
    }

    /// Session bookkeeping, for inspection after an export.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    fn visible_in_session(&self, selected: bool) -> bool {
        !self.session.selection_only || selected
    }
}

impl SceneHost for SnapshotHost {
    fn set_coordinate_system(&mut self, system: CoordinateSystem) {
        self.session.coordinate_system = Some(system);
    }

    fn initialise(&mut self, selection_only: bool) {
        self.session.selection_only = selection_only;
        self.session.initialised = true;
    }

    fn cameras(&self) -> Vec<HostCamera> {
        self.cameras
            .iter()
            .filter(|c| self.visible_in_session(c.node.selected))
            .cloned()
            .collect()
    }

    fn meshes(&self) -> Vec<HostMesh> {
        self.meshes
            .iter()
            .filter(|m| self.visible_in_session(m.node.selected))
            .cloned()
            .collect()
    }

    fn lights(&self) -> Vec<HostLight> {
        self.lights
            .iter()
            .filter(|l| self.visible_in_session(l.node.selected))
            .cloned()
            .collect()
    }

    fn material(&self, handle: MaterialHandle) -> Option<HostMaterial> {
        self.materials.iter().find(|m| m.handle == handle).cloned()
    }

    fn scene_property(&self, name: &str) -> Option<PropertyValue> {
        self.properties.get(name).cloned()
    }

    fn background_color(&self) -> Color3 {
        self.background_color
    }

    fn ambient_color(&self) -> Color3 {
        self.ambient_color
    }

    fn atmospherics(&self) -> Vec<HostAtmospheric> {
        self.atmospherics.clone()
    }

    fn save_document(&mut self) -> std::result::Result<(), HostError> {
        self.session.saves += 1;
        if self.fail_save {
            return Err(HostError::SaveFailed("document is read-only".to_string()));
        }
        Ok(())
    }

    fn pump_events(&mut self) {
        self.session.events_pumped += 1;
    }

    fn document_name(&self) -> Option<String> {
        self.document_name.clone()
    }
}
