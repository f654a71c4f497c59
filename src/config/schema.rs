//! Configuration schema types for `sck.toml`
//!
//! Defines the structure and validation rules for sasskit project configuration.

use crate::build::options::{default_browser_targets, CompileOptions, OutputStyle, PrefixOptions};
use crate::build::resolve::DependencyIndex;
use crate::service::DEFAULT_SASS_COMMAND;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sass compiler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SassConfig {
    /// CSS output style
    #[serde(default)]
    pub output_style: OutputStyle,
    /// Digits after the decimal point (legacy compilers only; Dart Sass
    /// always uses 10)
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Extra load paths for imports
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// Compile when a watched source is saved
    #[serde(default = "default_true")]
    pub compile_on_save: bool,
    /// Compiler executable. Dart Sass is assumed; set `legacy_flags` for
    /// Ruby Sass or sassc.
    #[serde(default = "default_command")]
    pub command: String,
    /// Pass `--precision` and `--default-encoding`, which Dart Sass rejects
    #[serde(default)]
    pub legacy_flags: bool,
}

impl Default for SassConfig {
    fn default() -> Self {
        Self {
            output_style: OutputStyle::default(),
            precision: default_precision(),
            include_paths: vec![],
            compile_on_save: true,
            command: default_command(),
            legacy_flags: false,
        }
    }
}

fn default_precision() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_command() -> String {
    DEFAULT_SASS_COMMAND.to_string()
}

/// Vendor prefixing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoprefixerConfig {
    /// Run the prefixer on compiled CSS
    #[serde(default)]
    pub enabled: bool,
    /// Visual cascade of prefixed declarations
    #[serde(default)]
    pub cascade: bool,
    /// Remove outdated prefixes
    #[serde(default = "default_true")]
    pub remove: bool,
    /// Browserslist queries
    #[serde(default = "default_browser_targets")]
    pub browsers: Vec<String>,
    /// Path prefixes to prefix (empty means all)
    #[serde(default)]
    pub include: Vec<String>,
    /// Path prefixes never prefixed
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for AutoprefixerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cascade: false,
            remove: true,
            browsers: default_browser_targets(),
            include: vec![],
            exclude: vec![],
        }
    }
}

/// Watch mode settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    /// Clear terminal between rebuilds
    #[serde(default = "default_true")]
    pub clear_screen: bool,
}

fn default_debounce_ms() -> u32 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms(), clear_screen: true }
    }
}

/// Complete sck.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SckConfig {
    /// Compiler settings
    #[serde(default)]
    pub sass: SassConfig,
    /// Prefixer settings
    #[serde(default)]
    pub autoprefixer: AutoprefixerConfig,
    /// Partial to dependents index
    #[serde(default)]
    pub dependencies: DependencyIndex,
    /// Watch settings
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "sass.command")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sck.toml: '{}' {}", self.field, self.message)
    }
}

impl SckConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.sass.command.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "sass.command".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        for (i, query) in self.autoprefixer.browsers.iter().enumerate() {
            if query.trim().is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("autoprefixer.browsers[{}]", i),
                    message: "must be a non-empty browserslist query".to_string(),
                });
            }
        }

        for (partial, dependents) in &self.dependencies {
            if Path::new(partial).is_absolute() {
                errors.push(ConfigValidationError {
                    field: format!("dependencies.\"{}\"", partial),
                    message: "keys must be relative to the project root".to_string(),
                });
            }
            for dependent in dependents {
                if Path::new(dependent).is_absolute() {
                    errors.push(ConfigValidationError {
                        field: format!("dependencies.\"{}\"", partial),
                        message: format!("'{}' must be relative to the project root", dependent),
                    });
                }
            }
        }

        if self.watch.debounce_ms == 0 {
            errors.push(ConfigValidationError {
                field: "watch.debounce_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Snapshot the compiler options for one run.
    ///
    /// Relative include paths are resolved against the project root. An
    /// empty dependency table is passed on as no index.
    pub fn compile_options(&self, project_root: Option<&Path>) -> CompileOptions {
        let include_paths = self
            .sass
            .include_paths
            .iter()
            .map(|p| match project_root {
                Some(root) if p.is_relative() => root.join(p),
                _ => p.clone(),
            })
            .collect();

        CompileOptions {
            output_style: self.sass.output_style,
            precision: self.sass.precision,
            include_paths,
            project_root: project_root.map(Path::to_path_buf),
            dependency_index: if self.dependencies.is_empty() {
                None
            } else {
                Some(self.dependencies.clone())
            },
        }
    }

    /// Snapshot the prefixer options for one run.
    pub fn prefix_options(&self) -> PrefixOptions {
        PrefixOptions {
            enabled: self.autoprefixer.enabled,
            cascade: self.autoprefixer.cascade,
            remove: self.autoprefixer.remove,
            browser_targets: self.autoprefixer.browsers.clone(),
            include_rules: self.autoprefixer.include.clone(),
            exclude_rules: self.autoprefixer.exclude.clone(),
            compress: self.sass.output_style == OutputStyle::Compressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: SckConfig = toml::from_str("").unwrap();
        assert_eq!(config, SckConfig::default());
        assert_eq!(config.sass.precision, 5);
        assert_eq!(config.sass.output_style, OutputStyle::Expanded);
        assert!(config.sass.compile_on_save);
        assert!(!config.sass.legacy_flags);
        assert!(!config.autoprefixer.enabled);
        assert!(config.autoprefixer.remove);
        assert_eq!(config.watch.debounce_ms, 100);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config() {
        let toml_str = r#"
[sass]
output_style = "compressed"
precision = 10
include_paths = ["node_modules", "/opt/sass"]
compile_on_save = false
command = "sassc"
legacy_flags = true

[autoprefixer]
enabled = true
cascade = true
remove = false
browsers = ["last 1 version"]
include = ["components/"]
exclude = ["vendor/"]

[dependencies]
"scss/_vars.scss" = ["scss/app.scss", "scss/admin.scss"]

[watch]
debounce_ms = 250
clear_screen = false
"#;

        let config: SckConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sass.output_style, OutputStyle::Compressed);
        assert_eq!(config.sass.precision, 10);
        assert_eq!(config.sass.command, "sassc");
        assert!(config.sass.legacy_flags);
        assert!(!config.sass.compile_on_save);
        assert!(config.autoprefixer.enabled);
        assert_eq!(config.autoprefixer.exclude, vec!["vendor/"]);
        assert_eq!(config.dependencies["scss/_vars.scss"].len(), 2);
        assert_eq!(config.watch.debounce_ms, 250);
        assert!(config.is_valid());
    }

    #[test]
    fn test_capitalized_output_style() {
        let config: SckConfig = toml::from_str("[sass]\noutput_style = \"Nested\"").unwrap();
        assert_eq!(config.sass.output_style, OutputStyle::Nested);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = SckConfig::default();
        config.sass.command = " ".to_string();
        config.autoprefixer.browsers = vec!["".to_string()];
        config.dependencies.insert("/abs/_a.scss".to_string(), vec!["/abs/b.scss".to_string()]);
        config.watch.debounce_ms = 0;

        let errors = config.validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(errors.len(), 5);
        assert!(fields.contains(&"sass.command"));
        assert!(fields.contains(&"autoprefixer.browsers[0]"));
        assert!(fields.contains(&"watch.debounce_ms"));
    }

    #[test]
    fn test_compile_options_snapshot() {
        let mut config = SckConfig::default();
        config.sass.include_paths = vec![PathBuf::from("lib"), PathBuf::from("/abs")];

        let options = config.compile_options(Some(Path::new("/p")));
        assert_eq!(options.include_paths, vec![PathBuf::from("/p/lib"), PathBuf::from("/abs")]);
        assert_eq!(options.project_root, Some(PathBuf::from("/p")));
        assert!(options.dependency_index.is_none());

        config.dependencies.insert("_a.scss".to_string(), vec!["a.scss".to_string()]);
        assert!(config.compile_options(None).dependency_index.is_some());
    }

    #[test]
    fn test_prefix_options_snapshot() {
        let mut config = SckConfig::default();
        config.autoprefixer.enabled = true;
        config.autoprefixer.include = vec!["app/".to_string()];

        let options = config.prefix_options();
        assert!(options.enabled);
        assert_eq!(options.include_rules, vec!["app/"]);
        assert!(options.exclude_rules.is_empty());
        assert!(!options.compress);
    }
}
