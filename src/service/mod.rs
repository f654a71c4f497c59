//! External collaborators used by the compile engine.
//!
//! The engine never compiles Sass or rewrites CSS itself. It calls a
//! [`Transformer`], an optional [`PostProcessor`] and a [`Persister`],
//! each of which may suspend while waiting on a subprocess or the disk.

pub mod persist;
pub mod prefixer;
pub mod sass;

pub use persist::*;
pub use prefixer::*;
pub use sass::*;

use crate::build::options::{PrefixOptions, TransformOptions};
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sass compilation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransformError {
    pub message: String,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// CSS post-processing failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PostProcessError {
    pub message: String,
}

impl PostProcessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Writing the compiled CSS failed.
#[derive(Debug, Error)]
#[error("cannot write {}: {source}", path.display())]
pub struct PersistError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Per-file failure reported by a compile run. Never fatal to the run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The Sass compiler rejected the source
    #[error("compile failed: {0}")]
    Transform(#[from] TransformError),
    /// The prefixer rejected the compiled CSS
    #[error("post-processing failed: {0}")]
    PostProcess(#[from] PostProcessError),
    /// The output could not be written
    #[error("{0}")]
    Persist(#[from] PersistError),
    /// The job's task ended before it could report
    #[error("compile task aborted")]
    Aborted,
}

/// Compiles one Sass source into CSS text.
pub trait Transformer: Send + Sync + 'static {
    fn transform(
        &self,
        source: &Path,
        options: &TransformOptions,
    ) -> impl Future<Output = Result<String, TransformError>> + Send;
}

/// Rewrites compiled CSS, e.g. to add vendor prefixes.
pub trait PostProcessor: Send + Sync + 'static {
    fn process(
        &self,
        css: String,
        options: &PrefixOptions,
    ) -> impl Future<Output = Result<String, PostProcessError>> + Send;
}

/// Stores compiled CSS at its output path.
pub trait Persister: Send + Sync + 'static {
    fn write(
        &self,
        path: &Path,
        contents: String,
    ) -> impl Future<Output = Result<(), PersistError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_display() {
        let err = CompileError::from(TransformError::new("Undefined variable: $x"));
        assert_eq!(err.to_string(), "compile failed: Undefined variable: $x");

        let err = CompileError::from(PersistError {
            path: PathBuf::from("/p/css/app.css"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(err.to_string(), "cannot write /p/css/app.css: denied");
    }
}
