//! Configuration schema for reqtrace
//!
//! Config lives at `.config/reqtrace/config.yaml` relative to the project
//! root and is optional. Every field falls back to the layout of a Python
//! project verified with pytest and `pytest-json-report`.

use facet::Facet;
use reqtrace_core::{AnnotationSyntax, DocumentInfo};

/// Default config location, relative to the project root
pub const DEFAULT_CONFIG_PATH: &str = ".config/reqtrace/config.yaml";

/// Root configuration for reqtrace
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Directory holding the test files (default `tests`). Also the directory
    /// part of every test identifier.
    #[facet(default)]
    pub tests_dir: Option<String>,

    /// File-name glob selecting test files (default `test_*.py`)
    #[facet(default)]
    pub test_file_pattern: Option<String>,

    /// Design documents scanned for requirement IDs
    #[facet(default)]
    pub documents: Option<Vec<String>>,

    /// Test result feed written by the runner
    #[facet(default)]
    pub feed: Option<String>,

    /// Where the rendered report is written
    #[facet(default)]
    pub output: Option<String>,

    /// File holding the current version string
    #[facet(default)]
    pub version_file: Option<String>,

    /// Document whose front matter `docAuthor` is an author fallback
    /// (default: the first entry of `documents`)
    #[facet(default)]
    pub author_document: Option<String>,

    /// `docType` written into the report front matter
    #[facet(default)]
    pub doc_type: Option<String>,

    /// `docSubtitle` written into the report front matter
    #[facet(default)]
    pub doc_subtitle: Option<String>,

    /// How to run the test suite
    #[facet(default)]
    pub runner: Option<RunnerConfig>,

    /// Shape of annotated test declarations (default: pytest docstrings)
    #[facet(default)]
    pub annotations: Option<AnnotationSyntax>,
}

/// Test runner configuration
///
/// `{feed}` and `{tests_dir}` in any argument are replaced with the feed path
/// and the tests directory.
#[derive(Debug, Clone, Default, Facet)]
pub struct RunnerConfig {
    /// Command producing the result feed
    #[facet(default)]
    pub command: Option<Vec<String>>,

    /// Availability check run before the suite; an empty list disables it
    #[facet(default)]
    pub preflight: Option<Vec<String>>,

    /// Exit codes meaning "the suite ran" (default `[0, 1]`, where 1 is
    /// pytest's "some tests failed")
    #[facet(default)]
    pub accepted_exit_codes: Option<Vec<i32>>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    pub fn tests_dir(&self) -> &str {
        self.tests_dir.as_deref().unwrap_or("tests")
    }

    pub fn test_file_pattern(&self) -> &str {
        self.test_file_pattern.as_deref().unwrap_or("test_*.py")
    }

    pub fn documents(&self) -> Vec<String> {
        self.documents
            .clone()
            .unwrap_or_else(|| strings(&["resources/docs/srvp.md", "resources/docs/srs.md"]))
    }

    pub fn feed(&self) -> &str {
        self.feed.as_deref().unwrap_or("resources/docs/report.json")
    }

    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or("resources/docs/srvp_TR.md")
    }

    pub fn version_file(&self) -> &str {
        self.version_file.as_deref().unwrap_or("core/version_info.txt")
    }

    pub fn author_document(&self) -> Option<String> {
        self.author_document
            .clone()
            .or_else(|| self.documents().into_iter().next())
    }

    pub fn document_info(&self) -> DocumentInfo {
        let defaults = DocumentInfo::default();
        DocumentInfo {
            doc_type: self.doc_type.clone().unwrap_or(defaults.doc_type),
            doc_subtitle: self.doc_subtitle.clone().unwrap_or(defaults.doc_subtitle),
        }
    }

    pub fn annotation_syntax(&self) -> AnnotationSyntax {
        self.annotations.clone().unwrap_or_default()
    }

    pub fn runner_command(&self) -> Vec<String> {
        self.runner
            .as_ref()
            .and_then(|r| r.command.clone())
            .unwrap_or_else(|| {
                strings(&[
                    "python3",
                    "-m",
                    "pytest",
                    "--json-report",
                    "--json-report-file={feed}",
                    "{tests_dir}",
                    "-v",
                ])
            })
    }

    /// `None` when the preflight check is disabled
    pub fn runner_preflight(&self) -> Option<Vec<String>> {
        let preflight = self
            .runner
            .as_ref()
            .and_then(|r| r.preflight.clone())
            .unwrap_or_else(|| strings(&["python3", "-m", "pytest", "--version"]));
        (!preflight.is_empty()).then_some(preflight)
    }

    pub fn accepted_exit_codes(&self) -> Vec<i32> {
        self.runner
            .as_ref()
            .and_then(|r| r.accepted_exit_codes.clone())
            .unwrap_or_else(|| vec![0, 1])
    }
}
