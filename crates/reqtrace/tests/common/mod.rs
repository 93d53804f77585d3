//! Common test utilities.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Fixtures shared with reqtrace-core's integration tests
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("reqtrace-core")
        .join("tests")
        .join("fixtures")
}

fn copy(from: &Path, to: &Path) {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture dir");
    }
    std::fs::copy(from, to)
        .unwrap_or_else(|e| panic!("Failed to copy {}: {e}", from.display()));
}

/// Create a temporary project laid out with the default config paths:
/// `tests/`, `resources/docs/{srvp,srs}.md` and `resources/docs/report.json`.
pub fn create_temp_project() -> tempfile::TempDir {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let root = temp.path();
    let fixtures = fixtures_dir();

    for test_file in ["test_can.py", "test_logging.py"] {
        copy(
            &fixtures.join("tests").join(test_file),
            &root.join("tests").join(test_file),
        );
    }
    for doc in ["srvp.md", "srs.md", "report.json"] {
        copy(&fixtures.join(doc), &root.join("resources/docs").join(doc));
    }
    std::fs::write(root.join("pyproject.toml"), "[project]\nname = \"fixture\"\n")
        .expect("Failed to write pyproject.toml");

    temp
}

/// Path of the report written with the default config
pub fn report_path(root: &Path) -> PathBuf {
    root.join("resources/docs/srvp_TR.md")
}
