//! Post-processing inclusion policy.
//!
//! Decides per source file whether the prefixer runs, using literal
//! path-prefix rules relative to the project root.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Check whether post-processing applies to `source`.
///
/// A rule matches when the source path string starts with the project
/// root joined with the rule. Rules always stay under the root: a leading
/// `/` or `./` is ignored. An empty include list allows everything,
/// and a matching exclude rule always wins. Without a project root the
/// rules cannot be scoped and every file is included.
pub fn post_processing_applies(
    source: &Path,
    include: &[String],
    exclude: &[String],
    project_root: Option<&Path>,
) -> bool {
    let root = match project_root {
        Some(root) => root,
        None => return true,
    };

    let source = source.to_string_lossy();
    let matches = |rule: &String| source.starts_with(rule_prefix(root, rule).as_str());

    let is_exclude = !exclude.is_empty() && exclude.iter().any(matches);
    let is_include = include.is_empty() || include.iter().any(matches);

    is_include && !is_exclude
}

/// Build the literal match prefix for `rule` under `root`.
///
/// Only normal components are pushed, so `/vendor/` and `./vendor/` both
/// land at `<root>/vendor/`. A trailing separator on the rule is kept.
fn rule_prefix(root: &Path, rule: &str) -> String {
    let mut prefix = PathBuf::from(root);
    for component in Path::new(rule).components() {
        if let Component::Normal(part) = component {
            prefix.push(part);
        }
    }

    let mut prefix = prefix.to_string_lossy().into_owned();
    let trailing = rule.ends_with('/') || rule.ends_with(MAIN_SEPARATOR);
    if trailing && !prefix.ends_with(MAIN_SEPARATOR) {
        prefix.push(MAIN_SEPARATOR);
    }
    prefix
}
