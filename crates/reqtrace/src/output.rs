//! Console summary of a verification run

use crate::pipeline::RunSummary;
use eyre::{Result, WrapErr};
use facet::Facet;
use owo_colors::OwoColorize;
use reqtrace_core::{
    OutcomeCounts, ReportMetadata, RequirementCounts, RequirementRow, RequirementStatus,
};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a run summary in the specified format
pub fn render_summary(summary: &RunSummary, format: OutputFormat, verbose: bool) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(summary, verbose)),
        OutputFormat::Json => render_json(summary),
    }
}

fn render_text(summary: &RunSummary, verbose: bool) -> String {
    let report = &summary.report;
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!(
        "{} {} {}\n",
        "##".bold(),
        "Verification Report".cyan().bold(),
        report.metadata.version.dimmed()
    ));
    output.push('\n');

    let t = &report.tests;
    output.push_str(&format!(
        "Tests: {} passed, {} failed, {} skipped (total {})\n",
        t.passed.to_string().green(),
        colored_count(t.failed, true),
        t.skipped.to_string().yellow(),
        t.total
    ));
    let r = &report.requirements;
    output.push_str(&format!(
        "Requirements: {} verified, {} failed, {} pending (total {})\n",
        r.verified.to_string().green(),
        colored_count(r.failed, true),
        colored_count(r.pending, false),
        r.total
    ));
    output.push('\n');

    let failed: Vec<&RequirementRow> = report.failed_requirements().collect();
    if !failed.is_empty() {
        output.push_str(&format!(
            "{} Failed Requirements ({}):\n",
            "!".red().bold(),
            failed.len()
        ));
        for row in failed {
            output.push_str(&format!("  {} {}\n", "-".red(), row.id.as_str().red()));
            for evidence in &row.evidence {
                output.push_str(&format!(
                    "      {} {}\n",
                    evidence.test_id.dimmed(),
                    evidence.outcome
                ));
            }
        }
        output.push('\n');
    }

    if verbose {
        for row in &report.rows {
            let status = match row.status {
                RequirementStatus::Verified => row.status.label().green().to_string(),
                RequirementStatus::Failed => row.status.label().red().to_string(),
                RequirementStatus::NotStarted => row.status.label().yellow().to_string(),
            };
            output.push_str(&format!(
                "  {} {} ({} tests)\n",
                status,
                row.id,
                row.evidence.len()
            ));
        }
        output.push('\n');

        let meta = &summary.metadata;
        for (field, resolution) in [
            ("version", &meta.version),
            ("author", &meta.author),
            ("date", &meta.date),
        ] {
            output.push_str(&format!(
                "  {}: {} {}\n",
                field,
                resolution.value,
                format!("({})", resolution.source.as_deref().unwrap_or("default")).dimmed()
            ));
        }
        output.push('\n');
    }

    output
}

fn colored_count(count: usize, is_error: bool) -> String {
    match (count, is_error) {
        (0, _) => count.to_string(),
        (_, true) => count.to_string().red().to_string(),
        (_, false) => count.to_string().yellow().to_string(),
    }
}

#[derive(Facet)]
struct JsonSummary {
    output: String,
    suite_exit_code: Option<i32>,
    metadata: ReportMetadata,
    tests: OutcomeCounts,
    requirements: RequirementCounts,
    rows: Vec<JsonRow>,
    warnings: Vec<String>,
}

#[derive(Facet)]
struct JsonRow {
    id: String,
    status: String,
    tests: Vec<String>,
}

fn render_json(summary: &RunSummary) -> Result<String> {
    let report = &summary.report;
    let json = JsonSummary {
        output: summary.output_path.display().to_string(),
        suite_exit_code: summary.suite_exit_code,
        metadata: report.metadata.clone(),
        tests: report.tests,
        requirements: report.requirements,
        rows: report
            .rows
            .iter()
            .map(|row| JsonRow {
                id: row.id.to_string(),
                status: row.status.as_str().to_string(),
                tests: row.evidence.iter().map(|e| e.test_id.clone()).collect(),
            })
            .collect(),
        warnings: summary.warnings.clone(),
    };
    facet_json::to_string_pretty(&json).wrap_err("Failed to serialize run summary")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("html"), None);
    }
}
