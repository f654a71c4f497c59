//! Stamp command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::stamp::{stamp_file, StampError};

/// Run the stamp command
pub fn run_stamp(file: &Path, remove: bool) -> ExitCode {
    match stamp_file(file, remove) {
        Ok(true) => {
            let action = if remove { "Removed version stamps from" } else { "Stamped" };
            println!("{} {}", action, file.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(false) => {
            println!("No changes: {}", file.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e @ StampError::NotSource(_)) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
