//! Source file classification.
//!
//! Decides which files are Sass sources and which of those are partials.

use std::path::Path;

/// Extensions recognized as Sass sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["scss", "sass"];

/// Extension of compiled artifacts.
pub const OUTPUT_EXTENSION: &str = "css";

/// Leading character marking a partial (include-only) file.
pub const PARTIAL_MARKER: char = '_';

/// Check if a path has a recognized Sass source extension.
///
/// The comparison is case-sensitive: `style.SCSS` is not a source.
pub fn is_source_file(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => SOURCE_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Check if a path names a partial.
///
/// Partials are never compiled on their own.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(PARTIAL_MARKER))
        .unwrap_or(false)
}

/// Display name for a compiled file: the output base name without extension.
pub fn display_name(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file(Path::new("app.scss")));
        assert!(is_source_file(Path::new("/p/styles/app.sass")));
        assert!(!is_source_file(Path::new("app.css")));
        assert!(!is_source_file(Path::new("app.SCSS")));
        assert!(!is_source_file(Path::new("scss")));
    }

    #[test]
    fn test_is_partial() {
        assert!(is_partial(Path::new("/p/src/_vars.scss")));
        assert!(!is_partial(Path::new("/p/_src/vars.scss")));
        assert!(!is_partial(Path::new("app.scss")));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/p/css/app.css")), "app");
        assert_eq!(display_name(Path::new("theme.min.css")), "theme.min");
    }
}
