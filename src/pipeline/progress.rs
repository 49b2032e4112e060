//! Progress allocation and reporting for one export run.

use crate::report::{DiagnosticsSink, MessageColor, ProgressSink};

/// Progress when mesh traversal starts.
pub const MESHES_START: u8 = 10;
/// Progress when mesh traversal ends. Everything after meshes shares the
/// last slice.
pub const MESHES_END: u8 = 90;
pub const DONE: u8 = 100;

/// Progress after `done` of `total` meshes.
pub fn mesh_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return MESHES_END;
    }
    let span = (MESHES_END - MESHES_START) as usize;
    MESHES_START + (span * done.min(total) / total) as u8
}

/// Wraps the caller's sinks. Keeps progress non-decreasing and counts
/// warnings.
pub struct Reporter<'a> {
    progress: &'a mut dyn ProgressSink,
    diagnostics: &'a mut dyn DiagnosticsSink,
    current: u8,
    warnings: usize,
}

impl<'a> Reporter<'a> {
    pub fn new(progress: &'a mut dyn ProgressSink, diagnostics: &'a mut dyn DiagnosticsSink) -> Self {
        Self {
            progress,
            diagnostics,
            current: 0,
            warnings: 0,
        }
    }

    /// Report `value`, raised to the last reported value if lower.
    pub fn progress(&mut self, value: u8) {
        self.current = self.current.max(value.min(DONE));
        self.progress.report_progress(self.current);
    }

    pub fn message(&mut self, text: &str) {
        self.diagnostics.message(text, MessageColor::Black, 0, false);
    }

    pub fn styled(&mut self, text: &str, color: MessageColor, rank: u32, emphasis: bool) {
        self.diagnostics.message(text, color, rank, emphasis);
    }

    pub fn warning(&mut self, text: &str, rank: u32) {
        self.warnings += 1;
        self.diagnostics.warning(text, rank);
    }

    pub fn error(&mut self, text: &str, rank: u32) {
        self.diagnostics.error(text, rank);
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }
}
