//! Sasskit - Command-line tool for compiling Sass projects

use std::process::ExitCode;

use sasskit::cli;

fn main() -> ExitCode {
    cli::run()
}
