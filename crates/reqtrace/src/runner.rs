//! Test-suite runner
//!
//! Runs the configured test command as a subprocess. A suite that ran and had
//! failing tests is a normal outcome; failing to start the command or an exit
//! code outside the accepted set aborts the run.

use eyre::{Result, WrapErr, bail};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Lines of captured output kept in error messages
const OUTPUT_TAIL_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct TestRunner {
    command: Vec<String>,
    preflight: Option<Vec<String>>,
    accepted_exit_codes: Vec<i32>,
    workdir: PathBuf,
}

impl TestRunner {
    /// Build a runner, expanding `{feed}` and `{tests_dir}` placeholders.
    pub fn new(
        command: &[String],
        preflight: Option<&[String]>,
        accepted_exit_codes: Vec<i32>,
        workdir: impl Into<PathBuf>,
        feed: &Path,
        tests_dir: &str,
    ) -> Self {
        Self {
            command: expand(command, feed, tests_dir),
            preflight: preflight.map(|p| expand(p, feed, tests_dir)),
            accepted_exit_codes,
            workdir: workdir.into(),
        }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Run the preflight check, returning its trimmed stdout (e.g. the
    /// pytest version). Succeeds trivially when no preflight is configured.
    pub fn check_available(&self) -> Result<Option<String>> {
        let Some(preflight) = &self.preflight else {
            return Ok(None);
        };

        let output = spawn(preflight, &self.workdir)
            .wrap_err("Test runner is not available (preflight check could not start)")?;
        if !output.status.success() {
            bail!(
                "Test runner is not available: `{}` exited with {}\n{}",
                preflight.join(" "),
                output.status,
                output_tail(&output)
            );
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }

    /// Run the suite. Returns the exit code, which is one of the accepted
    /// codes.
    pub fn run(&self) -> Result<i32> {
        let output = spawn(&self.command, &self.workdir)?;

        let Some(code) = output.status.code() else {
            bail!(
                "`{}` was terminated by a signal\n{}",
                self.command.join(" "),
                output_tail(&output)
            );
        };

        if !self.accepted_exit_codes.contains(&code) {
            bail!(
                "`{}` exited with code {} (accepted: {:?})\n{}",
                self.command.join(" "),
                code,
                self.accepted_exit_codes,
                output_tail(&output)
            );
        }

        Ok(code)
    }
}

fn expand(template: &[String], feed: &Path, tests_dir: &str) -> Vec<String> {
    let feed = feed.display().to_string();
    template
        .iter()
        .map(|arg| arg.replace("{feed}", &feed).replace("{tests_dir}", tests_dir))
        .collect()
}

fn spawn(command: &[String], workdir: &Path) -> Result<Output> {
    let Some((program, args)) = command.split_first() else {
        bail!("Test runner command is empty");
    };
    Command::new(program)
        .args(args)
        .current_dir(workdir)
        .output()
        .wrap_err_with(|| format!("Failed to run `{}`", command.join(" ")))
}

fn output_tail(output: &Output) -> String {
    let mut tail = String::new();
    for (label, bytes) in [("stdout", &output.stdout), ("stderr", &output.stderr)] {
        let text = String::from_utf8_lossy(bytes);
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            continue;
        }
        let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
        tail.push_str(&format!("--- {} ---\n", label));
        for line in &lines[start..] {
            tail.push_str(line);
            tail.push('\n');
        }
    }
    tail
}
