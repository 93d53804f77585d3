//! Integration tests that run the reqtrace binary

mod common;

use std::path::Path;
use std::process::{Command, Output};

use common::{create_temp_project, report_path};

fn reqtrace_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reqtrace"));
    for var in [
        "RELEASE_AUTHOR",
        "GITHUB_ACTOR",
        "RELEASE_DATE",
        "RELEASE_VERSION",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Run against `root` with fixed metadata so output is reproducible
fn run_in(root: &Path, extra: &[&str]) -> Output {
    reqtrace_bin()
        .arg("--root")
        .arg(root)
        .args([
            "--author",
            "Release Bot",
            "--date",
            "2025-09-16",
            "--doc-version",
            "0.4.1",
        ])
        .args(extra)
        .current_dir(root)
        .output()
        .expect("Failed to run reqtrace")
}

#[test]
fn test_writes_report_from_existing_feed() {
    let project = create_temp_project();
    let output = run_in(project.path(), &["--skip-tests"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "Command should succeed: {stderr}");
    assert!(stderr.contains("Wrote report"), "stderr: {stderr}");

    let report = std::fs::read_to_string(report_path(project.path())).unwrap();
    assert!(report.starts_with(
        "---\n\
         docType: Software Requirements Verification Plan Report (SRVPR)\n\
         docSubtitle: CAN Frame Retransmission Tool\n\
         docVersion: 0.4.1\n\
         docAuthor: Release Bot\n\
         createdDate: 2025-09-16\n\
         ---\n"
    ));
    assert!(report.contains("| REQ-FUNC-CAN-001 | [x] Verified | tests/test_can.py::test_format_can_frame |"));
    assert!(report.contains("| REQ-NFR-REL-001 | [ ] Not Started |  |"));
    assert!(report.contains("- Tests: 3 passed, 1 failed, 1 skipped (total 5)"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Verification Report"), "stdout: {stdout}");
}

#[test]
fn test_rerun_is_byte_identical() {
    let project = create_temp_project();
    assert!(run_in(project.path(), &["--skip-tests"]).status.success());
    let first = std::fs::read(report_path(project.path())).unwrap();
    assert!(run_in(project.path(), &["--skip-tests"]).status.success());
    let second = std::fs::read(report_path(project.path())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_check_fails_on_failed_requirements() {
    let project = create_temp_project();
    let output = run_in(project.path(), &["--skip-tests", "--check"]);
    assert_eq!(output.status.code(), Some(1));
    // The report is still written
    assert!(report_path(project.path()).exists());
}

#[test]
fn test_json_summary() {
    let project = create_temp_project();
    let output = run_in(project.path(), &["--skip-tests", "--format", "json"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"REQ-FUNC-LOG-010\""), "stdout: {stdout}");
    assert!(stdout.contains("\"failed\""), "stdout: {stdout}");
    assert!(stdout.contains("\"not-started\""), "stdout: {stdout}");
}

#[test]
fn test_unavailable_runner_keeps_previous_report() {
    let project = create_temp_project();
    let root = project.path();
    std::fs::write(report_path(root), "previous report").unwrap();

    let config_dir = root.join(".config/reqtrace");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.yaml"),
        "runner:\n  preflight: [\"reqtrace-missing-runner\", \"--version\"]\n",
    )
    .unwrap();

    let output = run_in(root, &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not available"), "stderr: {stderr}");
    assert_eq!(
        std::fs::read_to_string(report_path(root)).unwrap(),
        "previous report"
    );
}

#[test]
fn test_missing_tests_dir_is_fatal() {
    let project = create_temp_project();
    std::fs::remove_dir_all(project.path().join("tests")).unwrap();

    let output = run_in(project.path(), &["--skip-tests"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Tests directory not found"), "stderr: {stderr}");
    assert!(!report_path(project.path()).exists());
}

#[test]
fn test_explicit_config_must_exist() {
    let project = create_temp_project();
    let output = run_in(project.path(), &["--skip-tests", "-c", "nope.yaml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Config file not found"), "stderr: {stderr}");
}

#[test]
fn test_config_relocates_paths() {
    let project = create_temp_project();
    let root = project.path();
    std::fs::rename(root.join("tests"), root.join("checks")).unwrap();
    let config_dir = root.join(".config/reqtrace");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.yaml"),
        "tests_dir: checks\noutput: out/report.md\ndoc_subtitle: Bus Monitor\n",
    )
    .unwrap();

    let output = run_in(root, &["--skip-tests"]);
    assert!(output.status.success());
    let report = std::fs::read_to_string(root.join("out/report.md")).unwrap();
    assert!(report.contains("docSubtitle: Bus Monitor"));
    // Test IDs now carry the `checks/` prefix and miss the feed's records
    assert!(report.contains("`checks/test_can.py::test_format_can_frame` — skipped"));
}
