//! Change resolution.
//!
//! Maps one changed file to the set of top-level sources that must be
//! recompiled. Partials are resolved through the dependency index when it
//! has an entry for them, and otherwise by scanning their directory.

use crate::build::source::{is_partial, is_source_file};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Precomputed mapping from a project-relative partial path to the
/// project-relative top-level files that include it.
pub type DependencyIndex = HashMap<String, Vec<String>>;

/// Resolve the sources to recompile after `changed` was modified.
///
/// - A non-partial resolves to itself.
/// - A partial with a non-empty index entry resolves to that entry, each
///   path re-based under `project_root`, in index order.
/// - Any other partial resolves to the non-partial sources in its own
///   directory, in directory listing order. An unreadable directory
///   yields no sources.
pub fn resolve_changed_file(
    changed: &Path,
    project_root: Option<&Path>,
    index: Option<&DependencyIndex>,
) -> Vec<PathBuf> {
    if !is_partial(changed) {
        return vec![changed.to_path_buf()];
    }

    if let (Some(root), Some(index)) = (project_root, index) {
        if let Some(dependents) = lookup_dependents(changed, root, index) {
            debug!(
                partial = %changed.display(),
                count = dependents.len(),
                "resolved partial through dependency index"
            );
            return dependents;
        }
    }

    let dir = containing_dir(changed);
    let siblings = sources_in_directory(dir);
    debug!(
        partial = %changed.display(),
        dir = %dir.display(),
        count = siblings.len(),
        "resolved partial by directory scan"
    );
    siblings
}

/// Directory holding `path`; a bare file name lives in `.`.
fn containing_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Look up a partial in the index. `None` means the scan fallback applies.
fn lookup_dependents(
    changed: &Path,
    project_root: &Path,
    index: &DependencyIndex,
) -> Option<Vec<PathBuf>> {
    let key = index_key(changed, project_root)?;
    let entries = index.get(&key).filter(|list| !list.is_empty());
    if entries.is_none() {
        trace!(key = %key, "no dependency index entry");
    }
    entries.map(|list| list.iter().map(|rel| project_root.join(rel)).collect())
}

/// Project-relative key for `path`, using `/` separators.
///
/// Returns `None` when `path` is not under `project_root`.
pub fn index_key(path: &Path, project_root: &Path) -> Option<String> {
    let relative = path.strip_prefix(project_root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Non-partial Sass sources directly inside `dir`, in listing order.
pub fn sources_in_directory(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "cannot scan directory");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_source_file(path) && !is_partial(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(&path).unwrap();
        path
    }

    fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths.sort();
        paths
    }

    #[test]
    fn test_non_partial_resolves_to_itself() {
        let file = PathBuf::from("/p/scss/app.scss");
        let mut index = DependencyIndex::new();
        index.insert("scss/app.scss".to_string(), vec!["scss/other.scss".to_string()]);

        let resolved = resolve_changed_file(&file, Some(Path::new("/p")), Some(&index));
        assert_eq!(resolved, vec![file]);
    }

    #[test]
    fn test_partial_uses_index_in_order() {
        let mut index = DependencyIndex::new();
        index.insert(
            "scss/_vars.scss".to_string(),
            vec!["scss/z.scss".to_string(), "pages/a.scss".to_string()],
        );

        let resolved = resolve_changed_file(
            Path::new("/p/scss/_vars.scss"),
            Some(Path::new("/p")),
            Some(&index),
        );
        assert_eq!(
            resolved,
            vec![PathBuf::from("/p/scss/z.scss"), PathBuf::from("/p/pages/a.scss")]
        );
    }

    #[test]
    fn test_partial_with_empty_index_entry_scans_directory() {
        let temp = TempDir::new().unwrap();
        let partial = touch(temp.path(), "scss/_vars.scss");
        let app = touch(temp.path(), "scss/app.scss");
        let mut index = DependencyIndex::new();
        index.insert("scss/_vars.scss".to_string(), vec![]);

        let resolved = resolve_changed_file(&partial, Some(temp.path()), Some(&index));
        assert_eq!(resolved, vec![app]);
    }

    #[test]
    fn test_partial_without_index_scans_directory() {
        let temp = TempDir::new().unwrap();
        let partial = touch(temp.path(), "_mixins.scss");
        let a = touch(temp.path(), "a.scss");
        let b = touch(temp.path(), "b.sass");
        touch(temp.path(), "_other.scss");
        touch(temp.path(), "notes.txt");
        touch(temp.path(), "nested/c.scss");

        let resolved = resolve_changed_file(&partial, None, None);
        assert_eq!(sorted(resolved), vec![a, b]);
    }

    #[test]
    fn test_partial_alone_resolves_to_nothing() {
        let temp = TempDir::new().unwrap();
        let partial = touch(temp.path(), "_only.scss");

        assert!(resolve_changed_file(&partial, None, None).is_empty());
    }

    #[test]
    fn test_partial_outside_project_root_scans_directory() {
        let temp = TempDir::new().unwrap();
        let partial = touch(temp.path(), "_vars.scss");
        let app = touch(temp.path(), "app.scss");
        let mut index = DependencyIndex::new();
        index.insert("_vars.scss".to_string(), vec!["elsewhere.scss".to_string()]);

        let resolved =
            resolve_changed_file(&partial, Some(Path::new("/unrelated/root")), Some(&index));
        assert_eq!(resolved, vec![app]);
    }

    #[test]
    fn test_containing_dir_of_bare_name_is_current_dir() {
        assert_eq!(containing_dir(Path::new("_vars.scss")), Path::new("."));
        assert_eq!(containing_dir(Path::new("scss/_vars.scss")), Path::new("scss"));
        assert_eq!(containing_dir(Path::new("/p/_vars.scss")), Path::new("/p"));
    }

    #[test]
    fn test_index_key() {
        let root = Path::new("/p");
        assert_eq!(index_key(Path::new("/p/a/_b.scss"), root), Some("a/_b.scss".to_string()));
        assert_eq!(index_key(Path::new("/q/_b.scss"), root), None);
        assert_eq!(index_key(Path::new("/p"), root), None);
    }
}
