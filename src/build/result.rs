//! Compile run results.
//!
//! Aggregates the per-file events of a run into a summary.

use crate::build::event::CompileEvent;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// CSS written
    Success,
    /// Failed with error
    Failed(String),
}

impl FileStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, FileStatus::Success)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, FileStatus::Failed(_))
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Success => write!(f, "success"),
            FileStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of compiling a single file.
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Output base name
    pub name: String,
    /// Compiled source
    pub source: PathBuf,
    /// Written CSS file, if any
    pub output: Option<PathBuf>,
    /// Compile status
    pub status: FileStatus,
}

/// Result of a complete run, in completion order.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Results for each file
    pub files: Vec<FileResult>,
    /// Whether `Finished` was observed
    pub finished: bool,
    /// Time from start until the last event
    pub total_duration: Duration,
}

impl RunSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the summary.
    pub fn record(&mut self, event: &CompileEvent) {
        match event {
            CompileEvent::Started { .. } => {}
            CompileEvent::Succeeded { name, source, output } => self.files.push(FileResult {
                name: name.clone(),
                source: source.clone(),
                output: Some(output.clone()),
                status: FileStatus::Success,
            }),
            CompileEvent::Failed { name, source, error } => self.files.push(FileResult {
                name: name.clone(),
                source: source.clone(),
                output: None,
                status: FileStatus::Failed(error.to_string()),
            }),
            CompileEvent::Finished => self.finished = true,
        }
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Get the number of files written.
    pub fn success_count(&self) -> usize {
        self.files.iter().filter(|r| r.status.is_success()).count()
    }

    /// Get the number of failed files.
    pub fn failed_count(&self) -> usize {
        self.files.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Check if every file compiled.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get all outputs written.
    pub fn outputs(&self) -> Vec<&PathBuf> {
        self.files.iter().filter_map(|r| r.output.as_ref()).collect()
    }

    /// Get failed file results.
    pub fn failures(&self) -> Vec<&FileResult> {
        self.files.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Format a summary of the run.
    pub fn summary(&self) -> String {
        let success = self.success_count();
        let failed = self.failed_count();
        let total = self.files.len();

        if failed == 0 {
            return format!(
                "Compile succeeded: {} of {} written in {:?}",
                success, total, self.total_duration
            );
        }

        let mut lines = vec![format!(
            "Compile failed: {} succeeded, {} failed ({} total)",
            success, failed, total
        )];
        for file in self.failures() {
            lines.push(format!("  - {}: {}", file.name, file.status));
        }
        lines.join("\n")
    }
}
