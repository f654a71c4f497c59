//! Cache-busting version stamps for asset references
//!
//! Rewrites `url(...)` references to images and fonts in Sass sources so
//! they carry a `?v=#{$version}` query, or strips it again.

use crate::build::source::is_source_file;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Query appended to stamped references. Interpolated by Sass at compile time.
pub const VERSION_QUERY: &str = "?v=#{$version}";

static ASSET_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(url\(['"]?[^'")]+\.)(png|gif|jpg|jpeg|svg|ttf|eot|woff)(\?v=[^'")]+)?(['"]?\))"#,
    )
    .expect("valid asset url regex")
});

/// Error while stamping a file
#[derive(Debug, Error)]
pub enum StampError {
    /// Only Sass sources are rewritten
    #[error("{} is not a Sass source", .0.display())]
    NotSource(PathBuf),
    /// File could not be read or written
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn rewrite(text: &str, insert: bool) -> String {
    ASSET_URL
        .replace_all(text, |caps: &Captures| {
            format!(
                "{}{}{}{}",
                &caps[1],
                &caps[2],
                if insert { VERSION_QUERY } else { "" },
                &caps[4]
            )
        })
        .into_owned()
}

/// Add a version query to every asset reference, replacing any existing one.
pub fn insert_version_stamps(text: &str) -> String {
    rewrite(text, true)
}

/// Strip version queries from every asset reference.
pub fn remove_version_stamps(text: &str) -> String {
    rewrite(text, false)
}

/// Stamp (or unstamp) a Sass source in place.
///
/// Returns whether the file changed. Unchanged files are not rewritten.
pub fn stamp_file(path: &Path, remove: bool) -> Result<bool, StampError> {
    if !is_source_file(path) {
        return Err(StampError::NotSource(path.to_path_buf()));
    }

    let io_err = |source| StampError::Io { path: path.to_path_buf(), source };
    let original = fs::read_to_string(path).map_err(io_err)?;
    let updated =
        if remove { remove_version_stamps(&original) } else { insert_version_stamps(&original) };

    if updated == original {
        return Ok(false);
    }

    fs::write(path, updated).map_err(io_err)?;
    tracing::debug!(path = %path.display(), remove, "rewrote version stamps");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_insert_stamps() {
        let input = ".logo { background: url('../img/logo.png'); }";
        assert_eq!(
            insert_version_stamps(input),
            ".logo { background: url('../img/logo.png?v=#{$version}'); }"
        );
    }

    #[test]
    fn test_insert_replaces_existing_query() {
        let input = "src: url(\"fonts/icons.woff?v=1.2.0\") format('woff');";
        assert_eq!(
            insert_version_stamps(input),
            "src: url(\"fonts/icons.woff?v=#{$version}\") format('woff');"
        );
    }

    #[test]
    fn test_insert_is_case_insensitive_and_unquoted() {
        let input = "a { b: url(photo.JPG); c: url(x.Svg) }";
        assert_eq!(
            insert_version_stamps(input),
            "a { b: url(photo.JPG?v=#{$version}); c: url(x.Svg?v=#{$version}) }"
        );
    }

    #[test]
    fn test_other_extensions_untouched() {
        let input = "@import url(theme.css); a { b: url(data.json) }";
        assert_eq!(insert_version_stamps(input), input);
    }

    #[test]
    fn test_remove_stamps() {
        let input = "a { b: url('x.gif?v=#{$version}'); c: url(y.ttf?v=3) }";
        assert_eq!(remove_version_stamps(input), "a { b: url('x.gif'); c: url(y.ttf) }");
    }

    #[test]
    fn test_stamp_file_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.scss");
        fs::write(&path, ".a { background: url(a.png); }").unwrap();

        assert!(stamp_file(&path, false).unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            ".a { background: url(a.png?v=#{$version}); }"
        );
        // second insert is a no-op
        assert!(!stamp_file(&path, false).unwrap());

        assert!(stamp_file(&path, true).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), ".a { background: url(a.png); }");
    }

    #[test]
    fn test_stamp_file_rejects_non_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.css");
        fs::write(&path, "").unwrap();
        assert!(matches!(stamp_file(&path, false), Err(StampError::NotSource(_))));
    }

    #[test]
    fn test_stamp_file_missing() {
        let temp = TempDir::new().unwrap();
        let result = stamp_file(&temp.path().join("gone.scss"), false);
        assert!(matches!(result, Err(StampError::Io { .. })));
    }
}
