//! Configuration loading and discovery for `sck.toml`
//!
//! Provides functions to find, load, and merge configuration. A project's
//! `package.json` may carry `sass` and `autoprefixer` objects that
//! override the loaded file field by field.

use super::schema::SckConfig;
use crate::build::options::OutputStyle;
use crate::build::resolve::DependencyIndex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "sck.toml";

/// Name of the package manifest that may carry project overrides.
pub const PACKAGE_FILE_NAME: &str = "package.json";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse sck.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// package.json parsing error
    #[error("Failed to parse {}: {source}", path.display())]
    Package {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Validation error
    #[error("Config validation failed:\n{}", bullet_list(.0))]
    Validation(Vec<String>),
}

fn bullet_list(errors: &[String]) -> String {
    errors.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n")
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output style
    pub output_style: Option<OutputStyle>,
    /// Override precision
    pub precision: Option<u32>,
    /// Extra load paths, appended after configured ones
    pub include_paths: Vec<PathBuf>,
    /// Force the prefixer on or off
    pub autoprefixer: Option<bool>,
    /// Override compiler executable
    pub command: Option<String>,
}

/// Find sck.toml in XDG config directory.
///
/// Checks XDG_CONFIG_HOME/sasskit/sck.toml, or ~/.config/sasskit/sck.toml.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("sasskit").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find sck.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load and validate configuration from an sck.toml file.
pub fn load_config(path: &Path) -> Result<SckConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: SckConfig = toml::from_str(&contents)?;
    check(config)
}

fn check(config: SckConfig) -> Result<SckConfig, ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(config)
}

/// Default configuration when no sck.toml is found.
pub fn default_config() -> SckConfig {
    SckConfig::default()
}

/// `sass` object of a package.json. Keys are camelCase, with legacy aliases.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageSass {
    #[serde(alias = "compileStyle")]
    output_style: Option<String>,
    precision: Option<u32>,
    #[serde(alias = "includePath")]
    include_paths: Option<Vec<PathBuf>>,
    compile_on_save: Option<bool>,
    #[serde(alias = "dependentList")]
    dependencies: Option<DependencyIndex>,
}

/// `autoprefixer` object of a package.json.
#[derive(Debug, Default, Deserialize)]
struct PackageAutoprefixer {
    enabled: Option<bool>,
    cascade: Option<bool>,
    remove: Option<bool>,
    browsers: Option<Vec<String>>,
    #[serde(alias = "include")]
    execute: Option<Vec<String>>,
    #[serde(alias = "exclude")]
    ignore: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct PackageOverrides {
    #[serde(default)]
    sass: Option<PackageSass>,
    #[serde(default)]
    autoprefixer: Option<PackageAutoprefixer>,
}

/// Apply `sass`/`autoprefixer` overrides from `<project_root>/package.json`.
///
/// Returns `Ok(false)` when there is no package.json. The merged config is
/// validated again; on any error `config` is left untouched.
pub fn apply_package_overrides(
    config: &mut SckConfig,
    project_root: &Path,
) -> Result<bool, ConfigError> {
    let path = project_root.join(PACKAGE_FILE_NAME);
    if !path.is_file() {
        return Ok(false);
    }

    let contents = fs::read_to_string(&path)?;
    let overrides: PackageOverrides = serde_json::from_str(&contents)
        .map_err(|source| ConfigError::Package { path: path.clone(), source })?;

    let mut merged = config.clone();

    if let Some(sass) = overrides.sass {
        if let Some(style) = sass.output_style {
            merged.sass.output_style = style.parse().map_err(|e: String| {
                ConfigError::Validation(vec![format!("{}: {}", path.display(), e)])
            })?;
        }
        if let Some(precision) = sass.precision {
            merged.sass.precision = precision;
        }
        if let Some(include_paths) = sass.include_paths {
            merged.sass.include_paths = include_paths;
        }
        if let Some(compile_on_save) = sass.compile_on_save {
            merged.sass.compile_on_save = compile_on_save;
        }
        if let Some(dependencies) = sass.dependencies {
            merged.dependencies = dependencies;
        }
    }

    if let Some(prefixer) = overrides.autoprefixer {
        let target = &mut merged.autoprefixer;
        if let Some(enabled) = prefixer.enabled {
            target.enabled = enabled;
        }
        if let Some(cascade) = prefixer.cascade {
            target.cascade = cascade;
        }
        if let Some(remove) = prefixer.remove {
            target.remove = remove;
        }
        if let Some(browsers) = prefixer.browsers {
            target.browsers = browsers;
        }
        if let Some(include) = prefixer.execute {
            target.include = include;
        }
        if let Some(exclude) = prefixer.ignore {
            target.exclude = exclude;
        }
    }

    *config = check(merged)?;
    Ok(true)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut SckConfig, overrides: &CliOverrides) {
    if let Some(style) = overrides.output_style {
        config.sass.output_style = style;
    }

    if let Some(precision) = overrides.precision {
        config.sass.precision = precision;
    }

    config.sass.include_paths.extend(overrides.include_paths.iter().cloned());

    if let Some(enabled) = overrides.autoprefixer {
        config.autoprefixer.enabled = enabled;
    }

    if let Some(ref command) = overrides.command {
        config.sass.command = command.clone();
    }
}

/// Pick the project root owning `file`: the longest root that prefixes it.
pub fn project_root_for<'a>(file: &Path, roots: &'a [PathBuf]) -> Option<&'a Path> {
    roots
        .iter()
        .filter(|root| file.starts_with(root))
        .max_by_key(|root| root.as_os_str().len())
        .map(PathBuf::as_path)
}
