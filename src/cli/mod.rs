//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod compile;
mod stamp;
mod watch;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::build::options::OutputStyle;
use crate::config::loader::{
    apply_package_overrides, default_config, find_config_from, find_xdg_config, load_config,
    project_root_for, CliOverrides,
};
use crate::config::schema::SckConfig;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Environment variable holding the tracing filter.
pub const LOG_ENV: &str = "SCK_LOG";

/// Sasskit - compile Sass with partial-aware rebuilds and autoprefixing
#[derive(Parser)]
#[command(name = "sck")]
#[command(about = "Sasskit - compile Sass with partial-aware rebuilds and autoprefixing")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile the sources affected by a changed file
    Compile {
        /// Changed Sass file (.scss or .sass); partials compile their dependents
        file: PathBuf,

        /// Output style (compressed, compact, nested, expanded)
        #[arg(long)]
        style: Option<OutputStyle>,

        /// Digits after the decimal point
        #[arg(long)]
        precision: Option<u32>,

        /// Extra load path for imports (repeatable)
        #[arg(long = "load-path", value_name = "DIR")]
        load_paths: Vec<PathBuf>,

        /// Force vendor prefixing on
        #[arg(long, conflicts_with = "no_prefix")]
        prefix: bool,

        /// Force vendor prefixing off
        #[arg(long)]
        no_prefix: bool,

        /// Sass compiler executable
        #[arg(long = "sass", value_name = "PROGRAM")]
        sass: Option<String>,

        /// Emit one JSON object per event instead of console lines
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Watch the project and compile sources on save
    Watch {
        /// Project root to watch (default: directory of sck.toml, or current directory)
        dir: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Add or remove `?v=#{$version}` cache-busting queries on asset urls
    Stamp {
        /// Sass source to rewrite in place
        file: PathBuf,

        /// Strip version queries instead of adding them
        #[arg(long)]
        remove: bool,
    },
}

/// Parse arguments and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            file,
            style,
            precision,
            load_paths,
            prefix,
            no_prefix,
            sass,
            json,
            verbose,
        } => {
            init_logging(verbose);
            let overrides = CliOverrides {
                output_style: style,
                precision,
                include_paths: load_paths,
                autoprefixer: if prefix {
                    Some(true)
                } else if no_prefix {
                    Some(false)
                } else {
                    None
                },
                command: sass,
            };
            compile::run_compile(&file, &overrides, json, verbose)
        }
        Commands::Watch { dir, verbose } => {
            init_logging(verbose);
            watch::run_watch(dir.as_deref(), verbose)
        }
        Commands::Stamp { file, remove } => {
            init_logging(false);
            stamp::run_stamp(&file, remove)
        }
    }
}

/// Install the tracing subscriber.
///
/// `verbose` shows debug output for this crate. Otherwise `SCK_LOG` takes
/// an `EnvFilter` directive, defaulting to warnings only.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("warn,sasskit=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Configuration resolved for one project.
pub(crate) struct Project {
    /// `sck.toml` (or defaults), without package.json applied
    pub config: SckConfig,
    pub root: Option<PathBuf>,
}

impl Project {
    /// The configuration with package.json overrides from the project root.
    ///
    /// A broken package.json is reported and skipped.
    pub fn with_package_overrides(&self) -> SckConfig {
        let mut config = self.config.clone();
        if let Some(root) = &self.root {
            if let Err(e) = apply_package_overrides(&mut config, root) {
                eprintln!("Warning: ignoring package.json: {}", e);
            }
        }
        config
    }
}

/// Load `sck.toml` for `anchor`, searching upward from `search_from`.
///
/// The project root is the longest of the config directory and the
/// current directory that contains `anchor`.
pub(crate) fn load_project(
    anchor: &Path,
    search_from: &Path,
    verbose: bool,
) -> Result<Project, ExitCode> {
    let local = find_config_from(search_from.to_path_buf());
    let config_path = local.clone().or_else(find_xdg_config);

    let config = match &config_path {
        Some(path) => {
            if verbose {
                println!("Using config: {}", path.display());
            }
            load_config(path).map_err(|e| {
                eprintln!("Error loading config: {}", e);
                ExitCode::from(EXIT_INVALID_ARGS)
            })?
        }
        None => {
            if verbose {
                println!("No sck.toml found, using defaults");
            }
            default_config()
        }
    };

    let mut roots: Vec<PathBuf> =
        local.as_deref().and_then(Path::parent).map(Path::to_path_buf).into_iter().collect();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    let root = project_root_for(anchor, &roots).map(Path::to_path_buf);

    Ok(Project { config, root })
}

/// Make `path` absolute against the current directory.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf, ExitCode> {
    std::path::absolute(path).map_err(|e| {
        eprintln!("Error: cannot resolve {}: {}", path.display(), e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

/// Create the async runtime that drives compile runs.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, ExitCode> {
    tokio::runtime::Runtime::new().map_err(|e| {
        eprintln!("Error: Failed to create async runtime: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}
