//! Per-run option snapshots.
//!
//! A run receives immutable copies of these; nothing in the engine
//! mutates them after the run starts.

use crate::build::resolve::DependencyIndex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CSS output formatting requested from the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Minified output
    #[serde(alias = "Compressed")]
    Compressed,
    /// One rule per line
    #[serde(alias = "Compact")]
    Compact,
    /// Indentation follows source nesting
    #[serde(alias = "Nested")]
    Nested,
    /// Fully expanded, one declaration per line
    #[default]
    #[serde(alias = "Expanded")]
    Expanded,
}

impl OutputStyle {
    /// Name as accepted by the `sass` command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputStyle::Compressed => "compressed",
            OutputStyle::Compact => "compact",
            OutputStyle::Nested => "nested",
            OutputStyle::Expanded => "expanded",
        }
    }
}

impl std::fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OutputStyle {
    type Err = String;

    /// Case-insensitive, so `"Expanded"` and `"expanded"` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compressed" => Ok(OutputStyle::Compressed),
            "compact" => Ok(OutputStyle::Compact),
            "nested" => Ok(OutputStyle::Nested),
            "expanded" => Ok(OutputStyle::Expanded),
            other => Err(format!(
                "unknown output style '{}' (expected compressed, compact, nested or expanded)",
                other
            )),
        }
    }
}

/// Options controlling compilation of every job in a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileOptions {
    /// CSS output style
    pub output_style: OutputStyle,
    /// Digits after the decimal point in emitted numbers
    pub precision: u32,
    /// Extra directories searched by `@import`/`@use`, in order
    pub include_paths: Vec<PathBuf>,
    /// Project root; scopes the dependency index and inclusion rules
    pub project_root: Option<PathBuf>,
    /// Partial-to-dependents index, keyed by project-relative paths
    pub dependency_index: Option<DependencyIndex>,
}

impl CompileOptions {
    /// Options the transformer needs for a single file.
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            output_style: self.output_style,
            precision: self.precision,
            include_paths: self.include_paths.clone(),
        }
    }
}

/// The subset of [`CompileOptions`] handed to a transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOptions {
    pub output_style: OutputStyle,
    pub precision: u32,
    pub include_paths: Vec<PathBuf>,
}

/// Options for the vendor-prefixing post-processor.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixOptions {
    /// Whether post-processing runs at all
    pub enabled: bool,
    /// Align prefixed declarations visually
    pub cascade: bool,
    /// Remove prefixes the targets no longer need
    pub remove: bool,
    /// Browserslist queries
    pub browser_targets: Vec<String>,
    /// Path prefixes (relative to the project root) to post-process
    pub include_rules: Vec<String>,
    /// Path prefixes (relative to the project root) never post-processed
    pub exclude_rules: Vec<String>,
    /// Print the prefixed stylesheet compressed
    pub compress: bool,
}

impl Default for PrefixOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            cascade: false,
            remove: true,
            browser_targets: default_browser_targets(),
            include_rules: vec![],
            exclude_rules: vec![],
            compress: false,
        }
    }
}

/// Browserslist queries used when none are configured.
pub fn default_browser_targets() -> Vec<String> {
    ["> 1%", "last 2 versions", "Firefox ESR", "not dead"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_style_parse() {
        assert_eq!("Expanded".parse::<OutputStyle>(), Ok(OutputStyle::Expanded));
        assert_eq!("compressed".parse::<OutputStyle>(), Ok(OutputStyle::Compressed));
        assert!("pretty".parse::<OutputStyle>().is_err());
    }

    #[test]
    fn test_output_style_display() {
        assert_eq!(OutputStyle::Nested.to_string(), "nested");
        assert_eq!(OutputStyle::default(), OutputStyle::Expanded);
    }

    #[test]
    fn test_transform_options_snapshot() {
        let options = CompileOptions {
            output_style: OutputStyle::Compact,
            precision: 8,
            include_paths: vec![PathBuf::from("/lib")],
            project_root: Some(PathBuf::from("/p")),
            dependency_index: None,
        };

        let transform = options.transform_options();
        assert_eq!(transform.output_style, OutputStyle::Compact);
        assert_eq!(transform.precision, 8);
        assert_eq!(transform.include_paths, vec![PathBuf::from("/lib")]);
    }

    #[test]
    fn test_prefix_options_default() {
        let options = PrefixOptions::default();
        assert!(!options.enabled);
        assert!(options.remove);
        assert!(!options.compress);
        assert_eq!(options.browser_targets.len(), 4);
    }
}
