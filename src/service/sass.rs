//! `sass` executable transformer.

use crate::build::options::TransformOptions;
use crate::service::{TransformError, Transformer};
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default compiler executable.
pub const DEFAULT_SASS_COMMAND: &str = "sass";

/// Compiles sources by spawning the Sass command line compiler and
/// capturing its standard output.
///
/// By default only flags understood by Dart Sass are passed. Legacy
/// compilers (Ruby Sass, sassc) additionally get `--precision` and
/// `--default-encoding utf-8`, which Dart Sass rejects.
#[derive(Debug, Clone)]
pub struct SassCommand {
    program: String,
    legacy_flags: bool,
}

impl SassCommand {
    /// Create a transformer that runs `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), legacy_flags: false }
    }

    /// Pass the legacy-only `--precision` and `--default-encoding` flags.
    pub fn with_legacy_flags(mut self, legacy_flags: bool) -> Self {
        self.legacy_flags = legacy_flags;
        self
    }

    /// Command line arguments for compiling `source`.
    pub fn arguments(&self, source: &Path, options: &TransformOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            vec!["--style".into(), options.output_style.as_str().into()];
        if self.legacy_flags {
            args.push("--precision".into());
            args.push(options.precision.to_string().into());
        }
        for path in &options.include_paths {
            args.push("--load-path".into());
            args.push(path.into());
        }
        if self.legacy_flags {
            args.push("--default-encoding".into());
            args.push("utf-8".into());
        }
        args.push(source.into());
        args
    }
}

impl Default for SassCommand {
    fn default() -> Self {
        Self::new(DEFAULT_SASS_COMMAND)
    }
}

impl Transformer for SassCommand {
    async fn transform(
        &self,
        source: &Path,
        options: &TransformOptions,
    ) -> Result<String, TransformError> {
        let args = self.arguments(source, options);
        debug!(program = %self.program, source = %source.display(), "spawning compiler");

        let output = Command::new(&self.program).args(&args).output().await.map_err(|e| {
            TransformError::new(format!("cannot run '{}': {}", self.program, e))
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            let message = if stderr.is_empty() {
                format!("'{}' exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(TransformError::new(message));
        }

        if !stderr.is_empty() {
            warn!(source = %source.display(), "{}", stderr);
        }

        String::from_utf8(output.stdout)
            .map_err(|e| TransformError::new(format!("compiler output is not UTF-8: {}", e)))
    }
}
