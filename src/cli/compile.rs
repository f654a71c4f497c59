//! Compile command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{absolute, load_project, runtime, EXIT_ERROR, EXIT_SUCCESS};
use crate::build::gate::{CompileGate, GatedRun};
use crate::build::orchestrator::CompileOrchestrator;
use crate::build::progress::{ConsoleProgress, JsonProgress, ProgressReporter};
use crate::config::loader::{merge_cli_overrides, CliOverrides};
use crate::service::{FsPersister, Prefixer, SassCommand};

/// Run the compile command for one changed file
pub fn run_compile(file: &Path, overrides: &CliOverrides, json: bool, verbose: bool) -> ExitCode {
    let file = match absolute(file) {
        Ok(file) => file,
        Err(code) => return code,
    };
    let search_from = file.parent().unwrap_or(&file).to_path_buf();

    let project = match load_project(&file, &search_from, verbose && !json) {
        Ok(project) => project,
        Err(code) => return code,
    };
    let mut config = project.with_package_overrides();
    merge_cli_overrides(&mut config, overrides);

    let compile = config.compile_options(project.root.as_deref());
    let prefix = config.prefix_options();

    let reporter: Box<dyn ProgressReporter> = if json {
        Box::new(JsonProgress::new())
    } else {
        Box::new(ConsoleProgress::new().with_verbose(verbose))
    };

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    let orchestrator = CompileOrchestrator::new(
        SassCommand::new(config.sass.command.clone())
            .with_legacy_flags(config.sass.legacy_flags),
        Prefixer::new(),
        FsPersister::new(),
    );
    let gate = CompileGate::new();

    let outcome =
        rt.block_on(gate.run(&orchestrator, &file, &compile, &prefix, reporter.as_ref()));

    if verbose && !json {
        if let GatedRun::Completed(summary) = &outcome {
            println!("{}", summary.summary());
        }
    }

    if outcome.is_success() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}
