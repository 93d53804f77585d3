//! Source providers for annotation and document extraction

use crate::lexer::{AnnotationSyntax, Annotations, extract_from_content};
use crate::req_id::{RequirementId, extract_requirement_ids};
use eyre::Result;
use std::collections::HashSet;
use std::path::PathBuf;

/// Result of scanning test sources, including any warnings
#[derive(Debug, Default)]
pub struct ScanResult {
    pub annotations: Annotations,
    pub warnings: Vec<String>,
}

/// Trait for providing test source files to extract annotations from
pub trait Sources {
    /// Extract annotations from all sources, in file order
    fn scan(self, syntax: &AnnotationSyntax) -> Result<ScanResult>;
}

/// In-memory sources (useful for testing)
///
/// Each entry is `(id prefix, content)` where the id prefix is the
/// `<dir>/<file>` part of the test identifiers, e.g. `tests/test_log.py`.
/// Entries are scanned in insertion order.
pub struct MemorySources(Vec<(String, String)>);

impl MemorySources {
    /// Create empty memory sources
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a file with content
    pub fn add(mut self, id_prefix: impl Into<String>, content: impl Into<String>) -> Self {
        self.0.push((id_prefix.into(), content.into()));
        self
    }
}

impl Default for MemorySources {
    fn default() -> Self {
        Self::new()
    }
}

impl Sources for MemorySources {
    fn scan(self, syntax: &AnnotationSyntax) -> Result<ScanResult> {
        let mut result = ScanResult::default();
        for (id_prefix, content) in self.0 {
            let warnings =
                extract_from_content(&id_prefix, &content, syntax, &mut result.annotations);
            result.warnings.extend(warnings);
        }
        Ok(result)
    }
}

/// Test files directly inside one directory whose names match a glob,
/// visited in lexical file-name order.
#[cfg(feature = "walk")]
pub struct TestDirSources {
    dir: PathBuf,
    id_dir: String,
    pattern: String,
}

#[cfg(feature = "walk")]
impl TestDirSources {
    /// `dir` is walked on disk; `id_dir` is the directory part used in test
    /// identifiers (e.g. `tests`).
    pub fn new(dir: impl Into<PathBuf>, id_dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            id_dir: id_dir.into(),
            pattern: "test_*.py".to_string(),
        }
    }

    /// File-name glob selecting test files (default `test_*.py`)
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    fn collect_files(&self) -> Result<Vec<(String, PathBuf)>> {
        use eyre::WrapErr;
        use ignore::WalkBuilder;

        let matcher = globset::Glob::new(&self.pattern)
            .wrap_err_with(|| format!("Invalid test file pattern '{}'", self.pattern))?
            .compile_matcher();

        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.dir)
            .max_depth(Some(1))
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry
                .wrap_err_with(|| format!("Failed to walk test directory {}", self.dir.display()))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            if !matcher.is_match(file_name) {
                continue;
            }
            let id_prefix = if self.id_dir.is_empty() {
                file_name.to_string()
            } else {
                format!("{}/{}", self.id_dir.trim_end_matches('/'), file_name)
            };
            files.push((id_prefix, entry.into_path()));
        }

        Ok(files)
    }
}

#[cfg(feature = "walk")]
impl Sources for TestDirSources {
    fn scan(self, syntax: &AnnotationSyntax) -> Result<ScanResult> {
        use eyre::WrapErr;

        let files = self.collect_files()?;

        let scan_file = |(id_prefix, path): &(String, PathBuf)| -> Result<(Annotations, Vec<String>)> {
            let content = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read test file {}", path.display()))?;
            Ok(Annotations::extract_from_content(id_prefix, &content, syntax))
        };

        // Files are parsed independently; collecting keeps lexical order
        #[cfg(feature = "parallel")]
        let per_file: Vec<Result<(Annotations, Vec<String>)>> = {
            use rayon::prelude::*;
            files.par_iter().map(scan_file).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let per_file: Vec<Result<(Annotations, Vec<String>)>> =
            files.iter().map(scan_file).collect();

        let mut result = ScanResult::default();
        for file_result in per_file {
            let (annotations, warnings) = file_result?;
            result.annotations.extend(annotations);
            result.warnings.extend(warnings);
        }
        Ok(result)
    }
}

/// Requirement IDs found in design documents
#[derive(Debug, Default)]
pub struct DocumentScan {
    /// Distinct IDs across all documents, first-seen order
    pub ids: Vec<RequirementId>,
    /// Missing or unreadable documents
    pub warnings: Vec<String>,
}

/// Design documents scanned as whole-file text
pub struct DocumentSources(Vec<PathBuf>);

impl DocumentSources {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self(paths.into_iter().map(Into::into).collect())
    }

    /// Scan every document. A missing or unreadable document contributes no
    /// IDs and a warning; this never fails.
    pub fn scan(&self) -> DocumentScan {
        let mut scan = DocumentScan::default();
        let mut seen = HashSet::new();

        for path in &self.0 {
            if !path.exists() {
                scan.warnings
                    .push(format!("Document not found: {}", path.display()));
                continue;
            }
            match std::fs::read_to_string(path) {
                Ok(text) => {
                    for id in extract_requirement_ids(&text) {
                        if seen.insert(id.clone()) {
                            scan.ids.push(id);
                        }
                    }
                }
                Err(e) => scan
                    .warnings
                    .push(format!("Failed to read document {}: {}", path.display(), e)),
            }
        }

        scan
    }
}
