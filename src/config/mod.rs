//! Configuration for sasskit projects
//!
//! Provides types and parsing for `sck.toml` project configuration, plus
//! the `package.json` override layer.

pub mod loader;
pub mod schema;

pub use loader::{
    apply_package_overrides, default_config, find_config_from, find_xdg_config, load_config,
    merge_cli_overrides, project_root_for, CliOverrides, ConfigError,
};
pub use schema::*;
