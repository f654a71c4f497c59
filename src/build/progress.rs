//! Compile progress reporting.
//!
//! Turns a run's [`CompileEvent`]s into console lines or JSON records.
//! Reporters are shared between concurrently running jobs' listeners, so
//! they take `&self` and keep counters in atomics.
//!
//! # Example
//!
//! ```ignore
//! use sasskit::build::progress::ConsoleProgress;
//!
//! let reporter = ConsoleProgress::new();
//! if let RunOutcome::Started(run) = orchestrator.run(&file, &compile, &prefix) {
//!     let summary = run.wait(&reporter).await;
//! }
//! ```

use crate::build::event::CompileEvent;
use crate::build::job::SkipReason;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report an event from a run.
    fn report(&self, event: &CompileEvent);

    /// Report that a trigger produced no run at all.
    fn skipped(&self, _reason: &SkipReason) {}
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: &CompileEvent) {}
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    use_colors: bool,
    verbose: bool,
    total: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    started_at: Mutex<Option<Instant>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .field("total", &self.total)
            .field("succeeded", &self.succeeded)
            .field("failed", &self.failed)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a console reporter on stderr, colored when stderr is a terminal.
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
            verbose: false,
            total: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            started_at: Mutex::new(None),
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { use_colors: false, output: Mutex::new(Box::new(output)), ..Self::new() }
    }

    /// Set verbose mode (also reports skipped triggers).
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started_at
            .lock()
            .ok()
            .and_then(|t| t.map(|t| t.elapsed().as_millis() as u64))
            .unwrap_or(0)
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: &CompileEvent) {
        match event {
            CompileEvent::Started { total } => {
                self.total.store(*total, Ordering::SeqCst);
                self.succeeded.store(0, Ordering::SeqCst);
                self.failed.store(0, Ordering::SeqCst);
                if let Ok(mut started) = self.started_at.lock() {
                    *started = Some(Instant::now());
                }
                self.writeln(&format!(
                    "{} Compiling {} file{}...",
                    self.cyan("[sass]"),
                    total,
                    if *total == 1 { "" } else { "s" }
                ));
            }
            CompileEvent::Succeeded { name, output, .. } => {
                let done = self.succeeded.fetch_add(1, Ordering::SeqCst)
                    + self.failed.load(Ordering::SeqCst)
                    + 1;
                self.writeln(&format!(
                    "{} [{}/{}] {} {} -> {}",
                    self.cyan("[sass]"),
                    done,
                    self.total.load(Ordering::SeqCst),
                    self.green("ok"),
                    name,
                    output.display()
                ));
            }
            CompileEvent::Failed { name, error, .. } => {
                let done = self.failed.fetch_add(1, Ordering::SeqCst)
                    + self.succeeded.load(Ordering::SeqCst)
                    + 1;
                self.writeln(&format!(
                    "{} [{}/{}] {} {}",
                    self.cyan("[sass]"),
                    done,
                    self.total.load(Ordering::SeqCst),
                    self.red("FAILED"),
                    name
                ));
                for line in error.to_string().lines() {
                    self.writeln(&format!("        {}", self.red(line)));
                }
            }
            CompileEvent::Finished => {
                let succeeded = self.succeeded.load(Ordering::SeqCst);
                let failed = self.failed.load(Ordering::SeqCst);
                let duration = format_duration(self.elapsed_ms());
                if failed == 0 {
                    self.writeln(&format!(
                        "{} {} compiled in {}",
                        self.green("[done]"),
                        succeeded,
                        duration
                    ));
                } else {
                    self.writeln(&format!(
                        "{} {} compiled, {} {} in {}",
                        self.red("[error]"),
                        succeeded,
                        failed,
                        if failed == 1 { "failure" } else { "failures" },
                        duration
                    ));
                }
            }
        }
    }

    fn skipped(&self, reason: &SkipReason) {
        if self.verbose {
            self.writeln(&format!("{} {}", self.yellow("[skip]"), reason));
        }
    }
}

/// JSON progress reporter, one object per line.
pub struct JsonProgress {
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for JsonProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonProgress").finish()
    }
}

impl JsonProgress {
    /// Create a new JSON progress reporter writing to stdout.
    pub fn new() -> Self {
        Self { output: Mutex::new(Box::new(std::io::stdout())) }
    }

    /// Create a JSON progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { output: Mutex::new(Box::new(output)) }
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", value);
        }
    }
}

impl Default for JsonProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for JsonProgress {
    fn report(&self, event: &CompileEvent) {
        let value = match event {
            CompileEvent::Started { total } => {
                serde_json::json!({ "event": "start", "total": total })
            }
            CompileEvent::Succeeded { name, source, output } => serde_json::json!({
                "event": "success",
                "name": name,
                "source": source.display().to_string(),
                "path": output.display().to_string(),
            }),
            CompileEvent::Failed { name, source, error } => serde_json::json!({
                "event": "error",
                "name": name,
                "source": source.display().to_string(),
                "error": error.to_string(),
            }),
            CompileEvent::Finished => serde_json::json!({ "event": "finished" }),
        };
        self.write_json(value);
    }

    fn skipped(&self, reason: &SkipReason) {
        self.write_json(serde_json::json!({ "event": "skipped", "reason": reason.to_string() }));
    }
}

/// Format a duration in milliseconds to a human-readable string.
fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}
