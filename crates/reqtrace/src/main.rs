//! reqtrace - Requirement verification reports from test results
//!
//! reqtrace runs a project's test suite, maps the results onto the
//! requirement IDs (`REQ-FUNC-LOG-010`) named in test docstrings and design
//! documents, and writes a markdown verification report.

use eyre::{Result, WrapErr};
use figue as args;
use owo_colors::OwoColorize;
use reqtrace::metadata::MetadataInputs;
use reqtrace::output::{OutputFormat, render_summary};
use reqtrace::{DEFAULT_CONFIG_PATH, RunOptions, find_project_root, load_config, load_config_if_present};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Debug, facet::Facet)]
struct Args {
    /// Path to config file (default: .config/reqtrace/config.yaml)
    #[facet(args::named, args::short = 'c', default)]
    config: Option<PathBuf>,

    /// Project root (default: nearest directory with Cargo.toml, pyproject.toml or .git)
    #[facet(args::named, default)]
    root: Option<PathBuf>,

    /// Reuse the existing result feed instead of running the test suite
    #[facet(args::named, default)]
    skip_tests: bool,

    /// Exit 1 if any requirement failed
    #[facet(args::named, default)]
    check: bool,

    /// Report author (overrides RELEASE_AUTHOR)
    #[facet(args::named, default)]
    author: Option<String>,

    /// Report date as YYYY-MM-DD (overrides RELEASE_DATE)
    #[facet(args::named, default)]
    date: Option<String>,

    /// Report version (overrides RELEASE_VERSION)
    #[facet(args::named, default)]
    doc_version: Option<String>,

    /// Show every requirement and where metadata came from
    #[facet(args::named, args::short = 'v', default)]
    verbose: bool,

    /// Output format: text, json
    #[facet(args::named, args::short = 'f', default)]
    format: Option<String>,
}

fn main() -> Result<()> {
    let args: Args = figue::from_std_args().wrap_err("Failed to parse command line arguments")?;

    let default_level = if args.verbose { "reqtrace=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = match args.format.as_deref() {
        None => OutputFormat::default(),
        Some(f) => OutputFormat::from_str(f)
            .ok_or_else(|| eyre::eyre!("Unknown output format '{}' (expected text or json)", f))?,
    };

    let project_root = match args.root {
        Some(root) => root,
        None => find_project_root()?,
    };

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_config_if_present(&project_root.join(DEFAULT_CONFIG_PATH))?,
    };

    let options = RunOptions {
        skip_tests: args.skip_tests,
        inputs: MetadataInputs::from_env().with_cli(args.author, args.date, args.doc_version),
    };

    let summary = reqtrace::run(&project_root, &config, &options)?;

    if !summary.warnings.is_empty() {
        eprintln!(
            "{} {} warnings:",
            "!".yellow().bold(),
            summary.warnings.len()
        );
        for warning in &summary.warnings {
            eprintln!("   {}", warning);
        }
    }

    print!("{}", render_summary(&summary, format, args.verbose)?);

    if args.check && summary.report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
