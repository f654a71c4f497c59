//! Filesystem persister.

use crate::service::{PersistError, Persister};
use std::path::Path;

/// Writes compiled CSS to disk, replacing any existing file.
///
/// The output directory is expected to exist; it is never created.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPersister;

impl FsPersister {
    pub fn new() -> Self {
        Self
    }
}

impl Persister for FsPersister {
    async fn write(&self, path: &Path, contents: String) -> Result<(), PersistError> {
        tokio::fs::write(path, contents)
            .await
            .map_err(|source| PersistError { path: path.to_path_buf(), source })
    }
}
