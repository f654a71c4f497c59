//! Watch command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{absolute, load_project, runtime, EXIT_ERROR, EXIT_SUCCESS};
use crate::build::progress::ConsoleProgress;
use crate::config::loader::find_config_from;
use crate::watch::{watch_and_compile, WatchOptions};

/// Run the watch command
pub fn run_watch(dir: Option<&Path>, verbose: bool) -> ExitCode {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => match std::env::current_dir() {
            Ok(cwd) => find_config_from(cwd.clone())
                .and_then(|p| p.parent().map(Path::to_path_buf))
                .unwrap_or(cwd),
            Err(e) => {
                eprintln!("Error: cannot read current directory: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        },
    };
    let dir = match absolute(&dir) {
        Ok(dir) => dir,
        Err(code) => return code,
    };

    let project = match load_project(&dir, &dir, verbose) {
        Ok(project) => project,
        Err(code) => return code,
    };

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    // package.json is re-read per batch on top of the base configuration.
    let options = WatchOptions { project_root: dir, config: project.config };
    let reporter = ConsoleProgress::new().with_verbose(verbose);

    match watch_and_compile(options, &rt, &reporter) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
