//! Run notifications.

use crate::service::CompileError;
use std::path::PathBuf;

/// An event delivered on a run's own channel.
///
/// Per run: one `Started`, then one `Succeeded` or `Failed` per job in
/// completion order, then one `Finished`.
#[derive(Debug)]
pub enum CompileEvent {
    /// The run has planned its jobs and launched them
    Started {
        /// Number of jobs in the run
        total: usize,
    },
    /// A job's CSS was written
    Succeeded {
        /// Output base name without extension
        name: String,
        /// Source that was compiled
        source: PathBuf,
        /// Where the CSS was written
        output: PathBuf,
    },
    /// A job failed at some stage
    Failed {
        /// Output base name without extension
        name: String,
        /// Source that was compiled
        source: PathBuf,
        /// What went wrong
        error: CompileError,
    },
    /// Every job has reported
    Finished,
}

impl CompileEvent {
    /// Check if this is the terminal event of a run.
    pub fn is_finished(&self) -> bool {
        matches!(self, CompileEvent::Finished)
    }

    /// Check if this event reports a single job's completion.
    pub fn is_job_completion(&self) -> bool {
        matches!(self, CompileEvent::Succeeded { .. } | CompileEvent::Failed { .. })
    }
}
