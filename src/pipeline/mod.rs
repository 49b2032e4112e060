//! The export pipeline.
//!
//! [`SceneExporter::export`] walks the host scene in a fixed order (cameras,
//! fog, meshes, materials, lights, skeletons), builds the document, and hands
//! it to the writer thread. Host data is only read on the calling thread.

pub mod cancel;
pub mod progress;


pub use cancel::CancellationToken;

use crate::document::{fog_mode, BabylonScene, Producer};
use crate::entity::{
    default_light, AccumulatedSkin, CameraExporter, EntityExporter, ExportContext, LightExporter,
    MaterialExporter, MeshExporter, QueuedMaterial, SkinExporter,
};
use crate::error::{ExportError, Result};
use crate::export::{spawn_commit, CommitReport};
use crate::host::{scene_bool, scene_vector3, FogType, SceneHost};
use crate::report::{DiagnosticsSink, MessageColor, ProgressSink};
use crate::types::{CoordinateSystem, RotationMode};
use progress::{mesh_progress, Reporter, DONE, MESHES_END, MESHES_START};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Scene property holding the gravity vector.
pub const GRAVITY_PROPERTY: &str = "babylonjs_gravity";
/// Scene property selecting quaternion (default) or Euler rotations.
pub const QUATERNIONS_PROPERTY: &str = "babylonjs_exportquaternions";

/// Class name of the atmospheric effect exported as fog.
const FOG_CLASS_NAME: &str = "Fog";

/// Material drain passes: the snapshot taken when draining starts, then the
/// materials discovered while exporting it.
const MATERIAL_DRAIN_PASSES: usize = 2;

/// How long the caller's thread waits between host event pumps while the
/// writer thread runs.
const WRITER_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Export configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Write `<output>.manifest` after the document.
    pub generate_manifest: bool,
    /// Only export selected nodes.
    pub selection_only: bool,
    /// Ask the host to save its document before exporting.
    pub auto_save: bool,
    /// Copy texture files next to the document.
    pub copy_textures_to_output: bool,
    /// Export meshes hidden in the host.
    pub export_hidden_objects: bool,
}

impl ExportOptions {
    pub fn with_manifest(mut self, enabled: bool) -> Self {
        self.generate_manifest = enabled;
        self
    }

    pub fn with_selection_only(mut self, enabled: bool) -> Self {
        self.selection_only = enabled;
        self
    }

    pub fn with_auto_save(mut self, enabled: bool) -> Self {
        self.auto_save = enabled;
        self
    }

    pub fn with_copy_textures(mut self, enabled: bool) -> Self {
        self.copy_textures_to_output = enabled;
        self
    }

    pub fn with_hidden_objects(mut self, enabled: bool) -> Self {
        self.export_hidden_objects = enabled;
        self
    }
}

/// What a finished export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub document_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub bytes_written: usize,
    pub cameras: usize,
    pub active_camera_id: Option<String>,
    pub meshes: usize,
    pub materials: usize,
    pub multi_materials: usize,
    pub lights: usize,
    pub default_light_added: bool,
    pub skeletons: usize,
    pub textures_copied: usize,
    pub warnings: usize,
    pub elapsed: Duration,
}

/// Result of an export that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Completed(ExportSummary),
    /// Stopped through the cancellation token. Nothing was written.
    Cancelled,
}

impl ExportOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExportOutcome::Cancelled)
    }

    pub fn summary(&self) -> Option<&ExportSummary> {
        match self {
            ExportOutcome::Completed(summary) => Some(summary),
            ExportOutcome::Cancelled => None,
        }
    }
}

/// Drives exports with one set of options.
///
/// One export runs at a time; an overlapping call is rejected with
/// [`ExportError::ExportInProgress`].
#[derive(Debug, Default)]
pub struct SceneExporter {
    options: ExportOptions,
    cancel: CancellationToken,
    running: AtomicBool,
}

impl SceneExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
            running: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Token that cancels the running export. Clone it into the UI.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Export the host scene to `output_file`.
    ///
    /// Fails before doing any work if the directory of `output_file` does not
    /// exist. Every failure is also reported to `diagnostics`.
    pub fn export(
        &self,
        host: &mut dyn SceneHost,
        output_file: impl AsRef<Path>,
        progress: &mut dyn ProgressSink,
        diagnostics: &mut dyn DiagnosticsSink,
    ) -> Result<ExportOutcome> {
        let mut reporter = Reporter::new(progress, diagnostics);

        let _guard = match RunningGuard::acquire(&self.running) {
            Some(guard) => guard,
            None => return Err(fail(&mut reporter, ExportError::ExportInProgress)),
        };
        self.cancel.reset();

        let output_file = output_file.as_ref();
        let output_dir = match output_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        host.set_coordinate_system(CoordinateSystem::LeftHandedYUp);
        host.initialise(self.options.selection_only);

        reporter.styled("Exportation started", MessageColor::Blue, 0, false);
        reporter.progress(0);

        if !output_dir.is_dir() {
            return Err(fail(&mut reporter, ExportError::OutputDirectoryMissing(output_dir)));
        }

        let started = Instant::now();
        let mut ctx = ExportContext::new(BabylonScene::new(&output_dir), self.options.clone());
        let mut run = Run {
            host,
            reporter,
            cancel: &self.cancel,
            options: &self.options,
            default_light_added: false,
        };

        match run.build(&mut ctx) {
            Ok(()) => {}
            Err(Halt::Cancelled) => {
                log::info!("export to {} cancelled", output_file.display());
                run.reporter
                    .styled("Exportation cancelled", MessageColor::Blue, 0, false);
                return Ok(ExportOutcome::Cancelled);
            }
            Err(Halt::Failed(e)) => return Err(fail(&mut run.reporter, e)),
        }

        run.reporter.message("Saving to output file");
        let scene = &ctx.scene;
        let mut summary = ExportSummary {
            document_path: output_file.to_path_buf(),
            manifest_path: None,
            bytes_written: 0,
            cameras: scene.cameras.len(),
            active_camera_id: scene.active_camera_id.clone(),
            meshes: scene.meshes.len(),
            materials: scene.materials.len(),
            multi_materials: scene.multi_materials.len(),
            lights: scene.lights.len(),
            default_light_added: run.default_light_added,
            skeletons: scene.skeletons.len(),
            textures_copied: ctx.textures_copied,
            warnings: 0,
            elapsed: Duration::ZERO,
        };

        let report = match run.commit(ctx.scene, output_file) {
            Ok(report) => report,
            Err(e) => return Err(fail(&mut run.reporter, e)),
        };

        run.reporter.progress(DONE);
        summary.bytes_written = report.bytes_written;
        summary.manifest_path = report.manifest_path;
        summary.warnings = run.reporter.warnings();
        summary.elapsed = started.elapsed();

        let done = format!("Exportation done in {:.2}s", summary.elapsed.as_secs_f64());
        log::info!("{} ({})", done, output_file.display());
        run.reporter.styled(&done, MessageColor::Blue, 0, false);
        Ok(ExportOutcome::Completed(summary))
    }
}

/// Report a terminal failure and jump progress to the end.
fn fail(reporter: &mut Reporter<'_>, error: ExportError) -> ExportError {
    reporter.error(&format!("Exportation stopped: {}", error), 0);
    reporter.progress(DONE);
    error
}

/// Marks an exporter busy for the lifetime of one export.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Why the build stages stopped early.
enum Halt {
    Cancelled,
    Failed(ExportError),
}

impl From<ExportError> for Halt {
    fn from(e: ExportError) -> Self {
        Halt::Failed(e)
    }
}

/// State of one export while the document is built.
struct Run<'r, 'h> {
    host: &'h mut dyn SceneHost,
    reporter: Reporter<'r>,
    cancel: &'r CancellationToken,
    options: &'r ExportOptions,
    default_light_added: bool,
}

impl Run<'_, '_> {
    fn build(&mut self, ctx: &mut ExportContext) -> std::result::Result<(), Halt> {
        self.save_host_document();
        self.scene_properties(ctx);
        self.cameras(ctx);
        self.fog(ctx);
        self.meshes(ctx)?;
        self.materials(ctx)?;
        self.lights(ctx)?;
        self.skeletons(ctx);
        self.finalize(ctx);
        Ok(())
    }

    /// Cancellation poll point. Also lets the host service its UI.
    fn poll(&mut self) -> std::result::Result<(), Halt> {
        self.host.pump_events();
        if self.cancel.is_cancelled() {
            return Err(Halt::Cancelled);
        }
        Ok(())
    }

    /// Run one exporter, turning its failure into a warning.
    fn export_entity<E: EntityExporter>(
        &mut self,
        exporter: &E,
        node: &E::Node,
        ctx: &mut ExportContext,
    ) -> Option<E::Output> {
        log::debug!("exporting {} {}", E::KIND, E::node_name(node));
        let result = exporter.export(node, ctx);
        for note in ctx.take_notes() {
            self.reporter.warning(&note.text, note.rank);
        }
        match result {
            Ok(output) => output,
            Err(e) => {
                self.reporter.warning(&e.to_string(), 2);
                None
            }
        }
    }

    fn save_host_document(&mut self) {
        if !self.options.auto_save {
            return;
        }
        self.reporter.message("Saving host document");
        if let Err(e) = self.host.save_document() {
            self.reporter.warning(&e.to_string(), 1);
        }
    }

    fn scene_properties(&mut self, ctx: &mut ExportContext) {
        let host: &dyn SceneHost = &*self.host;
        let scene = &mut ctx.scene;
        scene.auto_clear = true;
        scene.clear_color = host.background_color().to_array();
        scene.ambient_color = host.ambient_color().to_array();
        scene.gravity = scene_vector3(host, GRAVITY_PROPERTY, [0.0, 0.0, 0.0]);
        scene.rotation_mode = if scene_bool(host, QUATERNIONS_PROPERTY, true) {
            RotationMode::Quaternion
        } else {
            RotationMode::Euler
        };
        scene.producer = Producer::new(host.document_name().unwrap_or_default());
    }

    fn cameras(&mut self, ctx: &mut ExportContext) {
        self.reporter.message("Exporting cameras");
        for camera in self.host.cameras() {
            let Some(id) = self.export_entity(&CameraExporter, &camera, ctx) else {
                continue;
            };
            // First exported camera wins.
            if ctx.scene.active_camera_id.is_none() {
                ctx.scene.active_camera_id = Some(id);
                let text = format!("Active camera set to {}", camera.node.name);
                self.reporter.styled(&text, MessageColor::Green, 1, true);
            }
        }

        if ctx.scene.active_camera_id.is_none() {
            self.reporter.warning("No camera defined", 1);
        } else {
            self.total(ctx.scene.cameras.len());
        }
    }

    fn fog(&mut self, ctx: &mut ExportContext) {
        let fog = self
            .host
            .atmospherics()
            .into_iter()
            .find(|a| a.active && a.class_name == FOG_CLASS_NAME && a.fog.is_some())
            .and_then(|a| a.fog);
        let Some(fog) = fog else {
            return;
        };

        self.reporter.message("Exporting fog");
        let scene = &mut ctx.scene;
        scene.fog_color = Some(fog.color.to_array());
        scene.fog_density = Some(fog.density);
        scene.fog_mode = match fog.fog_type {
            FogType::Standard => fog_mode::LINEAR,
            FogType::Layered => fog_mode::EXP,
        };
        // Camera planes scaled by the fog range; unset without a main camera.
        let planes = scene.active_camera().map(|c| (c.min_z, c.max_z));
        if let Some((min_z, max_z)) = planes {
            scene.fog_start = Some(min_z * fog.near);
            scene.fog_end = Some(max_z * fog.far);
        }
    }

    fn meshes(&mut self, ctx: &mut ExportContext) -> std::result::Result<(), Halt> {
        self.reporter.progress(MESHES_START);
        self.reporter.message("Exporting meshes");

        let meshes = self.host.meshes();
        let total = meshes.len();
        for (i, mesh) in meshes.iter().enumerate() {
            self.export_entity(&MeshExporter, mesh, ctx);
            self.reporter.progress(mesh_progress(i + 1, total));
            self.poll()?;
        }
        self.reporter.progress(MESHES_END);
        self.total(ctx.scene.meshes.len());
        Ok(())
    }

    fn materials(&mut self, ctx: &mut ExportContext) -> std::result::Result<(), Halt> {
        self.reporter.message("Exporting materials");

        for pass in 1..=MATERIAL_DRAIN_PASSES {
            let pending = ctx.materials.pending();
            if pending.is_empty() {
                break;
            }
            log::debug!("material pass {}: {} queued", pass, pending.len());

            for (handle, id) in pending {
                match self.host.material(handle) {
                    Some(material) => {
                        let queued = QueuedMaterial { material, id };
                        if self.export_entity(&MaterialExporter, &queued, ctx).is_none() {
                            ctx.materials.mark_abandoned(handle);
                        }
                    }
                    None => {
                        let text = format!("Material {} not found in host scene", id);
                        self.reporter.warning(&text, 2);
                        ctx.materials.mark_abandoned(handle);
                    }
                }
                self.poll()?;
            }
        }

        if !ctx.materials.is_drained() {
            for (_, id) in ctx.materials.abandon_pending() {
                let text = format!("Material {} is nested too deeply and was not exported", id);
                self.reporter.warning(&text, 2);
            }
        }
        self.total(ctx.scene.material_count());
        Ok(())
    }

    fn lights(&mut self, ctx: &mut ExportContext) -> std::result::Result<(), Halt> {
        self.reporter.message("Exporting lights");
        for light in self.host.lights() {
            self.export_entity(&LightExporter, &light, ctx);
            self.poll()?;
        }

        if ctx.scene.lights.is_empty() {
            self.reporter.warning("No light defined", 1);
            self.reporter
                .warning("A default hemispheric light was added for your convenience", 1);
            let light = default_light(&mut ctx.ids);
            ctx.scene.lights.push(light);
            self.default_light_added = true;
        } else {
            self.total(ctx.scene.lights.len());
        }
        Ok(())
    }

    fn skeletons(&mut self, ctx: &mut ExportContext) {
        let skins = ctx.skins.take();
        if skins.is_empty() {
            return;
        }
        self.reporter.message("Exporting skeletons");
        for (skin, id) in skins {
            self.export_entity(&SkinExporter, &AccumulatedSkin { skin, id }, ctx);
        }
    }

    fn finalize(&mut self, ctx: &mut ExportContext) {
        for orphan in ctx.resolve_parents() {
            let text = format!("Parent of {} was not exported", orphan);
            self.reporter.warning(&text, 1);
        }
        for dangling in ctx.scene.finalize() {
            self.reporter.warning(&dangling.to_string(), 1);
        }
    }

    /// Write on the writer thread while keeping host events flowing.
    fn commit(&mut self, scene: BabylonScene, output_file: &Path) -> Result<CommitReport> {
        let handle = spawn_commit(scene, output_file.to_path_buf(), self.options.generate_manifest)?;
        while !handle.is_finished() {
            self.host.pump_events();
            std::thread::sleep(WRITER_POLL_INTERVAL);
        }
        handle.join()
    }

    fn total(&mut self, count: usize) {
        let text = format!("Total: {}", count);
        self.reporter.styled(&text, MessageColor::Gray, 1, false);
    }
}
