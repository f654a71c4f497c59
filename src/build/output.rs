//! Output path resolution.
//!
//! Decides where the compiled CSS for a source file is written. Only
//! read-only filesystem checks are performed.

use crate::build::source::OUTPUT_EXTENSION;
use std::path::{Path, PathBuf};

/// Conventional output directory names, looked up as siblings of the
/// source directory.
pub const OUTPUT_DIR_CANDIDATES: &[&str] = &["css", "stylesheets"];

/// Resolve the output path for `source` using [`OUTPUT_DIR_CANDIDATES`].
pub fn resolve_output_path(source: &Path) -> PathBuf {
    resolve_output_path_with(source, OUTPUT_DIR_CANDIDATES)
}

/// Resolve the output path for `source` against a custom candidate list.
///
/// 1. An existing file `<dir>/<stem>.css` next to the source is kept.
/// 2. Otherwise each candidate name is joined with the parent of the
///    source directory. Every existing directory overrides the previous
///    match, so the last existing candidate in list order wins.
/// 3. With no candidate directory present, the source directory is used.
pub fn resolve_output_path_with(source: &Path, candidates: &[&str]) -> PathBuf {
    let source_dir = source.parent().unwrap_or_else(|| Path::new(""));
    let file_name = output_file_name(source);

    let sticky = source_dir.join(&file_name);
    if sticky.is_file() {
        return sticky;
    }

    let mut out_dir = source_dir.to_path_buf();
    if let Some(parent) = source_dir.parent() {
        // Last match wins; do not break early.
        for name in candidates {
            let dir = parent.join(name);
            if dir.is_dir() {
                out_dir = dir;
            }
        }
    }

    out_dir.join(file_name)
}

fn output_file_name(source: &Path) -> String {
    let stem = source.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    format!("{}.{}", stem, OUTPUT_EXTENSION)
}
