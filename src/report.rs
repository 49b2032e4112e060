//! Progress and diagnostics reporting.
//!
//! The exporter reports through two sinks injected by the caller. A UI would
//! forward them to a progress bar and a message list; [`LogSink`] forwards
//! them to the `log` facade.

/// Display color of an informational message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageColor {
    Black,
    Blue,
    Green,
    Gray,
}

/// Receives the export progress, an integer in 0..=100.
pub trait ProgressSink {
    fn report_progress(&mut self, progress: u8);
}

/// Receives leveled messages. `rank` is the nesting depth for hierarchical display.
pub trait DiagnosticsSink {
    fn warning(&mut self, text: &str, rank: u32);

    fn error(&mut self, text: &str, rank: u32);

    fn message(&mut self, text: &str, color: MessageColor, rank: u32, emphasis: bool);
}

/// Forwards everything to the `log` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report_progress(&mut self, progress: u8) {
        log::debug!("progress {}%", progress);
    }
}

impl DiagnosticsSink for LogSink {
    fn warning(&mut self, text: &str, rank: u32) {
        log::warn!("{}{}", indent(rank), text);
    }

    fn error(&mut self, text: &str, rank: u32) {
        log::error!("{}{}", indent(rank), text);
    }

    fn message(&mut self, text: &str, _color: MessageColor, rank: u32, _emphasis: bool) {
        log::info!("{}{}", indent(rank), text);
    }
}

fn indent(rank: u32) -> String {
    "  ".repeat(rank as usize)
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report_progress(&mut self, _progress: u8) {}
}

impl DiagnosticsSink for NullSink {
    fn warning(&mut self, _text: &str, _rank: u32) {}

    fn error(&mut self, _text: &str, _rank: u32) {}

    fn message(&mut self, _text: &str, _color: MessageColor, _rank: u32, _emphasis: bool) {}
}

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    pub text: String,
    pub rank: u32,
    pub color: Option<MessageColor>,
    pub emphasis: bool,
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticLog {
    pub entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(&self, level: Level) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.level == level)
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.with_level(Level::Warning).map(|d| d.text.as_str()).collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.with_level(Level::Error).map(|d| d.text.as_str()).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|d| d.text.contains(needle))
    }
}

impl DiagnosticsSink for DiagnosticLog {
    fn warning(&mut self, text: &str, rank: u32) {
        self.entries.push(Diagnostic {
            level: Level::Warning,
            text: text.to_string(),
            rank,
            color: None,
            emphasis: false,
        });
    }

    fn error(&mut self, text: &str, rank: u32) {
        self.entries.push(Diagnostic {
            level: Level::Error,
            text: text.to_string(),
            rank,
            color: None,
            emphasis: false,
        });
    }

    fn message(&mut self, text: &str, color: MessageColor, rank: u32, emphasis: bool) {
        self.entries.push(Diagnostic {
            level: Level::Info,
            text: text.to_string(),
            rank,
            color: Some(color),
            emphasis,
        });
    }
}

/// Keeps every progress value in memory.
#[derive(Debug, Default, Clone)]
pub struct ProgressLog {
    pub values: Vec<u8>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<u8> {
        self.values.last().copied()
    }

    /// True when no value is lower than the one before it.
    pub fn is_monotonic(&self) -> bool {
        self.values.windows(2).all(|w| w[0] <= w[1])
    }
}

impl ProgressSink for ProgressLog {
    fn report_progress(&mut self, progress: u8) {
        self.values.push(progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_log_levels() {
        let mut log = DiagnosticLog::new();
        log.message("Exporting meshes", MessageColor::Black, 0, false);
        log.warning("No light defined", 1);
        log.error("Output folder does not exist", 0);

        assert_eq!(log.warnings(), vec!["No light defined"]);
        assert_eq!(log.errors(), vec!["Output folder does not exist"]);
        assert!(log.contains("meshes"));
    }

    #[test]
    fn test_progress_log_monotonic() {
        let mut progress = ProgressLog::new();
        for v in [0, 10, 10, 50, 100] {
            progress.report_progress(v);
        }
        assert!(progress.is_monotonic());
        progress.report_progress(20);
        assert!(!progress.is_monotonic());
    }
}
