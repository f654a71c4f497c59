//! Concurrent compile orchestration.
//!
//! A run plans its jobs, emits `Started`, and launches every job at once
//! on the tokio runtime. Each job compiles, optionally post-processes and
//! persists its file, reports `Succeeded` or `Failed`, and decrements the
//! run's shared counter. The job that brings the counter to zero emits
//! `Finished`.
//!
//! # How It Works
//!
//! 1. [`CompilePlan::for_change`] resolves the sources, their outputs and
//!    whether each one is post-processed
//! 2. An empty plan or a non-Sass trigger returns [`RunOutcome::Skipped`]
//!    without emitting anything
//! 3. Otherwise a per-run channel is created and every job is spawned
//! 4. Failures stay local to their job; siblings always run to completion
//!
//! # Example
//!
//! ```ignore
//! use sasskit::build::{CompileOrchestrator, RunOutcome, NullProgress};
//! use sasskit::service::{FsPersister, Prefixer, SassCommand};
//!
//! let orchestrator = CompileOrchestrator::new(SassCommand::default(), Prefixer, FsPersister);
//! match orchestrator.run(&changed, &compile, &prefix) {
//!     RunOutcome::Started(run) => println!("{}", run.wait(&NullProgress).await.summary()),
//!     RunOutcome::Skipped(reason) => println!("skipped: {}", reason),
//! }
//! ```

use crate::build::event::CompileEvent;
use crate::build::job::{CompilePlan, Job, SkipReason};
use crate::build::options::{CompileOptions, OutputStyle, PrefixOptions, TransformOptions};
use crate::build::progress::ProgressReporter;
use crate::build::result::RunSummary;
use crate::service::{CompileError, Persister, PostProcessor, Transformer};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

/// Drives compile runs against a set of collaborators.
pub struct CompileOrchestrator<T, P, W> {
    transformer: Arc<T>,
    post_processor: Arc<P>,
    persister: Arc<W>,
}

impl<T, P, W> CompileOrchestrator<T, P, W>
where
    T: Transformer,
    P: PostProcessor,
    W: Persister,
{
    /// Create a new orchestrator.
    pub fn new(transformer: T, post_processor: P, persister: W) -> Self {
        Self {
            transformer: Arc::new(transformer),
            post_processor: Arc::new(post_processor),
            persister: Arc::new(persister),
        }
    }

    /// Start a run for a changed file.
    ///
    /// Planning happens synchronously. Jobs are spawned onto the current
    /// tokio runtime, so this must be called from within one.
    pub fn run(
        &self,
        changed: &Path,
        compile: &CompileOptions,
        prefix: &PrefixOptions,
    ) -> RunOutcome {
        match CompilePlan::for_change(changed, compile, prefix) {
            Ok(plan) => RunOutcome::Started(self.launch(plan, compile, prefix)),
            Err(reason) => {
                debug!(%reason, "run skipped");
                RunOutcome::Skipped(reason)
            }
        }
    }

    fn launch(
        &self,
        plan: CompilePlan,
        compile: &CompileOptions,
        prefix: &PrefixOptions,
    ) -> CompileRun {
        let jobs = plan.into_jobs();
        let total = jobs.len();
        let (events, receiver) = unbounded_channel();
        let shared = Arc::new(RunShared {
            remaining: AtomicUsize::new(total),
            transform_options: compile.transform_options(),
            prefix_options: PrefixOptions {
                compress: compile.output_style == OutputStyle::Compressed,
                ..prefix.clone()
            },
        });

        debug!(total, "run started");
        // Sent before any job exists, so it precedes every completion.
        let _ = events.send(CompileEvent::Started { total });

        for job in jobs {
            let worker = JobWorker {
                transformer: Arc::clone(&self.transformer),
                post_processor: Arc::clone(&self.post_processor),
                persister: Arc::clone(&self.persister),
                shared: Arc::clone(&shared),
                events: events.clone(),
            };
            tokio::spawn(worker.execute(job));
        }

        CompileRun { receiver, total, started_at: Instant::now(), done: false }
    }
}

/// What a call to [`CompileOrchestrator::run`] did.
#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing was launched and no events will be delivered
    Skipped(SkipReason),
    /// Jobs are running; events arrive on the run
    Started(CompileRun),
}

impl RunOutcome {
    /// Check if the trigger was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped(_))
    }
}

/// State shared by the jobs of one run.
struct RunShared {
    remaining: AtomicUsize,
    transform_options: TransformOptions,
    prefix_options: PrefixOptions,
}

struct JobWorker<T, P, W> {
    transformer: Arc<T>,
    post_processor: Arc<P>,
    persister: Arc<W>,
    shared: Arc<RunShared>,
    events: UnboundedSender<CompileEvent>,
}

impl<T, P, W> JobWorker<T, P, W>
where
    T: Transformer,
    P: PostProcessor,
    W: Persister,
{
    async fn execute(self, job: Job) {
        let mut completion = Completion::new(&self.shared, &self.events, &job);

        let event = match self.compile(&job).await {
            Ok(()) => {
                trace!(output = %job.output.display(), "job succeeded");
                CompileEvent::Succeeded {
                    name: job.name(),
                    source: job.source.clone(),
                    output: job.output.clone(),
                }
            }
            Err(error) => {
                debug!(source = %job.source.display(), %error, "job failed");
                CompileEvent::Failed { name: job.name(), source: job.source.clone(), error }
            }
        };
        completion.complete(event);
    }

    async fn compile(&self, job: &Job) -> Result<(), CompileError> {
        let css = self.transformer.transform(&job.source, &self.shared.transform_options).await?;
        let css = if job.apply_post_processing {
            self.post_processor.process(css, &self.shared.prefix_options).await?
        } else {
            css
        };
        self.persister.write(&job.output, css).await?;
        Ok(())
    }
}

/// Reports a job's completion and decrements the run counter exactly once.
///
/// If the job's task unwinds before reporting, the drop still reports a
/// failure and decrements, so `Finished` is never lost.
struct Completion<'a> {
    shared: &'a RunShared,
    events: &'a UnboundedSender<CompileEvent>,
    job: &'a Job,
    reported: bool,
}

impl<'a> Completion<'a> {
    fn new(shared: &'a RunShared, events: &'a UnboundedSender<CompileEvent>, job: &'a Job) -> Self {
        Self { shared, events, job, reported: false }
    }

    fn complete(&mut self, event: CompileEvent) {
        self.reported = true;
        self.emit(event);
        if self.shared.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            debug!("run finished");
            self.emit(CompileEvent::Finished);
        }
    }

    fn emit(&self, event: CompileEvent) {
        // The receiver may have been dropped; the job still counts.
        if self.events.send(event).is_err() {
            trace!("run listener detached");
        }
    }
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        if !self.reported {
            self.complete(CompileEvent::Failed {
                name: self.job.name(),
                source: self.job.source.clone(),
                error: CompileError::Aborted,
            });
        }
    }
}

/// Handle to a started run. Each run owns its own event channel.
#[derive(Debug)]
pub struct CompileRun {
    receiver: UnboundedReceiver<CompileEvent>,
    total: usize,
    started_at: Instant,
    done: bool,
}

impl CompileRun {
    /// Number of jobs in the run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Receive the next event. Returns `None` after `Finished`.
    pub async fn next_event(&mut self) -> Option<CompileEvent> {
        if self.done {
            return None;
        }
        let event = self.receiver.recv().await;
        match &event {
            Some(CompileEvent::Finished) | None => self.done = true,
            Some(_) => {}
        }
        event
    }

    /// Drain the run to `Finished`, forwarding every event to `reporter`.
    pub async fn wait(mut self, reporter: &dyn ProgressReporter) -> RunSummary {
        let mut summary = RunSummary::new();
        while let Some(event) = self.next_event().await {
            reporter.report(&event);
            summary.record(&event);
        }
        summary.with_duration(self.started_at.elapsed())
    }
}
