//! Watch mode for compile on save
//!
//! Watches a project root and compiles every saved Sass source through the
//! orchestrator. Partials fan out to their dependents as usual.

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::build::gate::{CompileGate, GatedRun};
use crate::build::orchestrator::CompileOrchestrator;
use crate::build::progress::ProgressReporter;
use crate::build::source::is_source_file;
use crate::config::loader::apply_package_overrides;
use crate::config::schema::SckConfig;
use crate::service::{FsPersister, Prefixer, SassCommand};

/// Error during watch mode
#[derive(Debug, Error)]
pub enum WatchError {
    /// Failed to initialize file watcher
    #[error("Failed to initialize file watcher: {0}")]
    WatcherInit(notify::Error),
    /// Failed to add watch path
    #[error("Failed to watch path: {0}")]
    WatchPath(notify::Error),
    /// Channel receive error
    #[error("Watch channel error: {0}")]
    ChannelError(String),
    /// Project root not found
    #[error("Project root not found: {}", .0.display())]
    RootNotFound(PathBuf),
}

/// Options for watch mode
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Directory to watch; also the project root for every compile
    pub project_root: PathBuf,
    /// `sck.toml` configuration without package.json applied; package.json
    /// is re-read on top of it for every batch
    pub config: SckConfig,
}

/// Clear the terminal screen
fn clear_screen() {
    // ANSI escape code to clear screen and move cursor to top-left
    print!("\x1B[2J\x1B[1;1H");
}

/// Get current timestamp for logging
fn timestamp() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
    let secs = now.as_secs() % 86400;
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Sources touched by one debounced batch, deduplicated and sorted.
///
/// Deleted files are dropped; a deleted top-level file has nothing left to
/// compile.
pub fn changed_sources(events: &[DebouncedEvent]) -> Vec<PathBuf> {
    events
        .iter()
        .filter(|e| matches!(e.kind, DebouncedEventKind::Any) && is_source_file(&e.path))
        .filter(|e| e.path.is_file())
        .map(|e| e.path.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Configuration for the next batch, with package.json re-read.
///
/// A broken package.json is reported and the base configuration is used.
pub fn effective_config(base: &SckConfig, project_root: &Path) -> SckConfig {
    let mut config = base.clone();
    if let Err(e) = apply_package_overrides(&mut config, project_root) {
        eprintln!("[{}] Ignoring package.json: {}", timestamp(), e);
        return base.clone();
    }
    config
}

/// Watch for saved sources and compile them.
///
/// Blocks until the watcher channel closes. Compile failures and watch
/// errors are reported and watching continues.
pub fn watch_and_compile(
    options: WatchOptions,
    runtime: &Runtime,
    reporter: &dyn ProgressReporter,
) -> Result<(), WatchError> {
    if !options.project_root.is_dir() {
        return Err(WatchError::RootNotFound(options.project_root.clone()));
    }

    let (tx, rx) = channel();
    let debounce_duration = Duration::from_millis(u64::from(options.config.watch.debounce_ms));
    let mut debouncer = new_debouncer(debounce_duration, tx).map_err(WatchError::WatcherInit)?;
    debouncer
        .watcher()
        .watch(&options.project_root, RecursiveMode::Recursive)
        .map_err(WatchError::WatchPath)?;

    let orchestrator = CompileOrchestrator::new(
        SassCommand::new(options.config.sass.command.clone())
            .with_legacy_flags(options.config.sass.legacy_flags),
        Prefixer::new(),
        FsPersister::new(),
    );
    let gate = CompileGate::new();

    if options.config.watch.clear_screen {
        clear_screen();
    }
    println!("[{}] Watching {} for changes...", timestamp(), options.project_root.display());

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let sources = changed_sources(&events);
                if sources.is_empty() {
                    continue;
                }

                let config = effective_config(&options.config, &options.project_root);
                if !config.sass.compile_on_save {
                    debug!(count = sources.len(), "compile on save disabled");
                    continue;
                }

                if options.config.watch.clear_screen {
                    clear_screen();
                }

                let compile = config.compile_options(Some(&options.project_root));
                let prefix = config.prefix_options();
                for source in &sources {
                    if let Some(name) = source.file_name() {
                        println!("[{}] Changed: {}", timestamp(), name.to_string_lossy());
                    }
                    let outcome = runtime.block_on(gate.run(
                        &orchestrator,
                        source,
                        &compile,
                        &prefix,
                        reporter,
                    ));
                    if let GatedRun::Busy = outcome {
                        warn!(source = %source.display(), "change dropped while a run was active");
                    }
                }

                println!(
                    "[{}] Watching {} for changes...",
                    timestamp(),
                    options.project_root.display()
                );
            }
            Ok(Err(error)) => {
                eprintln!("[{}] Watch error: {:?}", timestamp(), error);
                eprintln!("[{}] Continuing to watch...", timestamp());
            }
            Err(e) => {
                return Err(WatchError::ChannelError(e.to_string()));
            }
        }
    }
}
