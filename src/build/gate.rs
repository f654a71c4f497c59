//! Host-side run gating.
//!
//! The orchestrator does not stop two runs from writing the same outputs.
//! Hosts hold a [`CompileGate`] and only start a run while they hold its
//! guard.

use crate::build::job::SkipReason;
use crate::build::options::{CompileOptions, PrefixOptions};
use crate::build::orchestrator::{CompileOrchestrator, RunOutcome};
use crate::build::progress::ProgressReporter;
use crate::build::result::RunSummary;
use crate::service::{Persister, PostProcessor, Transformer};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Tracks whether a compile run is active.
#[derive(Debug, Clone, Default)]
pub struct CompileGate {
    active: Arc<AtomicBool>,
}

impl CompileGate {
    /// Create an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate. Returns `None` while another run holds it.
    pub fn try_acquire(&self) -> Option<GateGuard> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GateGuard { active: Arc::clone(&self.active) })
    }

    /// Check if a run currently holds the gate.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Run one change through `orchestrator` while holding the gate.
    ///
    /// The gate stays claimed until the run has delivered `Finished`.
    pub async fn run<T, P, W>(
        &self,
        orchestrator: &CompileOrchestrator<T, P, W>,
        changed: &Path,
        compile: &CompileOptions,
        prefix: &PrefixOptions,
        reporter: &dyn ProgressReporter,
    ) -> GatedRun
    where
        T: Transformer,
        P: PostProcessor,
        W: Persister,
    {
        let Some(_guard) = self.try_acquire() else {
            debug!(changed = %changed.display(), "run already active");
            return GatedRun::Busy;
        };

        match orchestrator.run(changed, compile, prefix) {
            RunOutcome::Skipped(reason) => {
                reporter.skipped(&reason);
                GatedRun::Skipped(reason)
            }
            RunOutcome::Started(run) => GatedRun::Completed(run.wait(reporter).await),
        }
    }
}

/// What [`CompileGate::run`] did with a change.
#[derive(Debug)]
pub enum GatedRun {
    /// Another run held the gate; nothing was started
    Busy,
    /// The orchestrator skipped the change
    Skipped(SkipReason),
    /// The run drained to `Finished`
    Completed(RunSummary),
}

impl GatedRun {
    /// True unless a started run had failures.
    pub fn is_success(&self) -> bool {
        match self {
            GatedRun::Completed(summary) => summary.is_success(),
            GatedRun::Busy | GatedRun::Skipped(_) => true,
        }
    }
}

/// Proof that the holder may run. Releases the gate on drop.
#[derive(Debug)]
pub struct GateGuard {
    active: Arc<AtomicBool>,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}
