//! One verification run: suite, scans, reconciliation, report
//!
//! The test suite and the source/document scans are independent and run
//! concurrently. The report file is only written once every phase succeeded,
//! so a failed run leaves the previous report in place.

use crate::config::Config;
use crate::metadata::{MetadataInputs, MetadataPaths, ResolvedMetadata, resolve_metadata};
use crate::runner::TestRunner;
use eyre::{Result, WrapErr, bail};
use owo_colors::OwoColorize;
use reqtrace_core::{
    Annotations, Associations, DocumentScan, DocumentSources, OutcomeStore, RequirementUniverse,
    ScanResult, TestDirSources, VerificationReport,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Reuse the existing result feed instead of running the suite
    pub skip_tests: bool,
    pub inputs: MetadataInputs,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: VerificationReport,
    pub output_path: PathBuf,
    /// Exit code of the suite, `None` with `skip_tests`
    pub suite_exit_code: Option<i32>,
    pub metadata: ResolvedMetadata,
    /// Non-fatal problems: missing documents, malformed docstrings
    pub warnings: Vec<String>,
}

/// Run the whole pipeline for the project at `project_root`.
pub fn run(project_root: &Path, config: &Config, options: &RunOptions) -> Result<RunSummary> {
    let tests_dir = project_root.join(config.tests_dir());
    if !tests_dir.is_dir() {
        bail!("Tests directory not found: {}", tests_dir.display());
    }
    let feed = project_root.join(config.feed());

    let (suite, scans) = rayon::join(
        || run_suite(project_root, config, &feed, options.skip_tests),
        || scan_sources(project_root, config, &tests_dir),
    );
    let (suite_exit_code, outcomes) = suite?;
    let (scan, documents) = scans?;

    let associations = Associations::build(&scan.annotations);
    for annotation in &scan.annotations.annotations {
        for requirement in &annotation.requirements {
            tracing::debug!("{} -> {}", requirement, annotation.test_id);
        }
        if !outcomes.contains(&annotation.test_id) {
            tracing::debug!(test = %annotation.test_id, "annotated test has no result, counted as skipped");
        }
    }
    let universe = RequirementUniverse::new(&associations, &documents.ids);
    tracing::debug!(
        annotated = associations.len(),
        documented = documents.ids.len(),
        total = universe.len(),
        "requirement universe"
    );

    let metadata = resolve_metadata(
        &options.inputs,
        &MetadataPaths {
            project_root: project_root.to_path_buf(),
            version_file: project_root.join(config.version_file()),
            author_document: config.author_document().map(|d| project_root.join(d)),
            git_env: Vec::new(),
        },
    );
    for (field, resolution) in [
        ("version", &metadata.version),
        ("author", &metadata.author),
        ("date", &metadata.date),
    ] {
        for skipped in &resolution.skipped {
            tracing::debug!(field, source = %skipped.source, error = ?skipped.error, "metadata source skipped");
        }
        tracing::debug!(field, value = %resolution.value, source = ?resolution.source, "metadata resolved");
    }

    let report = VerificationReport::compute(
        &universe,
        &associations,
        &outcomes,
        metadata.metadata.clone(),
        config.document_info(),
    );
    for row in &report.rows {
        let outcomes: Vec<&str> = row.evidence.iter().map(|e| e.outcome.as_str()).collect();
        tracing::debug!(status = %row.status, ?outcomes, "{}", row.id);
    }

    let output_path = project_root.join(config.output());
    write_report(&output_path, &report.render_markdown())?;
    eprintln!(
        "{} Wrote report to {}",
        "OK".green().bold(),
        output_path.display()
    );

    let mut warnings = scan.warnings;
    warnings.extend(documents.warnings);

    Ok(RunSummary {
        report,
        output_path,
        suite_exit_code,
        metadata,
        warnings,
    })
}

/// Phase A: run the suite unless skipped, then load the feed it produced
fn run_suite(
    project_root: &Path,
    config: &Config,
    feed: &Path,
    skip_tests: bool,
) -> Result<(Option<i32>, OutcomeStore)> {
    let exit_code = if skip_tests {
        eprintln!(
            "{} Skipping test run, reusing {}",
            "->".blue().bold(),
            feed.display()
        );
        None
    } else {
        let runner = TestRunner::new(
            &config.runner_command(),
            config.runner_preflight().as_deref(),
            config.accepted_exit_codes(),
            project_root,
            feed,
            config.tests_dir(),
        );

        if let Some(version) = runner.check_available()? {
            tracing::debug!(%version, "test runner available");
        }

        if let Some(parent) = feed.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        // The feed must come from this run
        match std::fs::remove_file(feed) {
            Ok(()) => tracing::debug!(feed = %feed.display(), "removed previous result feed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).wrap_err_with(|| {
                    format!("Failed to remove previous result feed {}", feed.display())
                });
            }
        }

        eprintln!(
            "{} Running tests: {}",
            "->".blue().bold(),
            runner.command().join(" ").cyan()
        );
        let code = runner.run()?;
        tracing::debug!(code, "test suite finished");
        Some(code)
    };

    if !feed.exists() {
        bail!(
            "Test result feed not found at {}{}",
            feed.display(),
            if skip_tests {
                " (run without --skip-tests to produce it)"
            } else {
                " (the test runner did not write it)"
            }
        );
    }
    let outcomes = OutcomeStore::load(feed)?;
    eprintln!(
        "   Loaded {} test results",
        outcomes.len().to_string().green()
    );

    Ok((exit_code, outcomes))
}

fn scan_sources(
    project_root: &Path,
    config: &Config,
    tests_dir: &Path,
) -> Result<(ScanResult, DocumentScan)> {
    let scan = Annotations::extract(
        TestDirSources::new(tests_dir, config.tests_dir()).pattern(config.test_file_pattern()),
        &config.annotation_syntax(),
    )
    .wrap_err_with(|| format!("Failed to scan {}", tests_dir.display()))?;
    eprintln!(
        "   Found {} annotated tests",
        scan.annotations.len().to_string().green()
    );

    let documents = DocumentSources::new(
        config
            .documents()
            .into_iter()
            .map(|d| project_root.join(d)),
    )
    .scan();
    eprintln!(
        "   Found {} requirements in documents",
        documents.ids.len().to_string().green()
    );

    Ok((scan, documents))
}

fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).wrap_err_with(|| format!("Failed to write {}", path.display()))
}
