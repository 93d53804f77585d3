//! reqtrace library
//!
//! Runs a project's test suite, reconciles the results with the requirement
//! IDs named in test docstrings and design documents, and writes a
//! verification report.

pub mod config;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod runner;

pub use config::{Config, DEFAULT_CONFIG_PATH, RunnerConfig};
pub use pipeline::{RunOptions, RunSummary, run};

use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};

/// Files marking the root of a project
const ROOT_MARKERS: &[&str] = &["Cargo.toml", "pyproject.toml", ".git"];

/// Walk up from the current directory to the first directory holding a
/// project marker; falls back to the current directory.
pub fn find_project_root() -> Result<PathBuf> {
    let start = std::env::current_dir().wrap_err("Failed to get current directory")?;
    Ok(find_project_root_from(&start))
}

pub fn find_project_root_from(start: &Path) -> PathBuf {
    let mut current = start.to_path_buf();
    loop {
        if ROOT_MARKERS.iter().any(|m| current.join(m).exists()) {
            return current;
        }
        if !current.pop() {
            return start.to_path_buf();
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        eyre::bail!(
            "Config file not found at {}\n\n\
             Create a config file describing your project, for example:\n\n\
             tests_dir: tests\n\
             documents:\n  \
               - resources/docs/srvp.md\n\
             output: resources/docs/srvp_TR.md",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load config if it exists, otherwise return the default config. A config
/// that exists but does not parse is still an error.
pub fn load_config_if_present(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}
