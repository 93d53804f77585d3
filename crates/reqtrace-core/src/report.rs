//! Verification report model and rendering

use crate::association::{Associations, RequirementUniverse};
use crate::metadata::ReportMetadata;
use crate::outcome::{OutcomeCounts, OutcomeStore, TestOutcome};
use crate::req_id::RequirementId;
use crate::status::{RequirementStatus, resolve};
use facet::Facet;

/// Fixed document identity written into the front matter
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct DocumentInfo {
    pub doc_type: String,
    pub doc_subtitle: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            doc_type: "Software Requirements Verification Plan Report (SRVPR)".to_string(),
            doc_subtitle: "CAN Frame Retransmission Tool".to_string(),
        }
    }
}

/// Requirement counts by resolved status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Facet)]
pub struct RequirementCounts {
    pub total: usize,
    pub verified: usize,
    pub failed: usize,
    pub pending: usize,
}

/// One associated test and its outcome
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Evidence {
    pub test_id: String,
    pub outcome: TestOutcome,
}

/// A requirement with its status and evidence
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct RequirementRow {
    pub id: RequirementId,
    pub status: RequirementStatus,
    pub evidence: Vec<Evidence>,
}

/// The full reconciliation result, ready to render
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct VerificationReport {
    pub document: DocumentInfo,
    pub metadata: ReportMetadata,
    pub tests: OutcomeCounts,
    pub requirements: RequirementCounts,
    /// Sorted ascending by requirement ID
    pub rows: Vec<RequirementRow>,
}

impl VerificationReport {
    /// Reconcile outcomes and associations over the requirement universe.
    pub fn compute(
        universe: &RequirementUniverse,
        associations: &Associations,
        outcomes: &OutcomeStore,
        metadata: ReportMetadata,
        document: DocumentInfo,
    ) -> Self {
        let rows: Vec<RequirementRow> = universe
            .iter()
            .map(|id| RequirementRow {
                id: id.clone(),
                status: resolve(id, associations, outcomes),
                evidence: associations
                    .tests_for(id)
                    .iter()
                    .map(|test_id| Evidence {
                        test_id: test_id.clone(),
                        outcome: outcomes.outcome_of(test_id),
                    })
                    .collect(),
            })
            .collect();

        let mut requirements = RequirementCounts {
            total: rows.len(),
            ..RequirementCounts::default()
        };
        for row in &rows {
            match row.status {
                RequirementStatus::Verified => requirements.verified += 1,
                RequirementStatus::Failed => requirements.failed += 1,
                RequirementStatus::NotStarted => requirements.pending += 1,
            }
        }

        Self {
            document,
            metadata,
            tests: outcomes.counts(),
            requirements,
            rows,
        }
    }

    /// Requirements that resolved to `Failed`
    pub fn failed_requirements(&self) -> impl Iterator<Item = &RequirementRow> {
        self.rows
            .iter()
            .filter(|r| r.status == RequirementStatus::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.requirements.failed > 0
    }

    /// Render the report as markdown with front matter. Byte-identical for
    /// identical inputs.
    pub fn render_markdown(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push("---".into());
        lines.push(format!("docType: {}", self.document.doc_type));
        lines.push(format!("docSubtitle: {}", self.document.doc_subtitle));
        lines.push(format!("docVersion: {}", self.metadata.version));
        lines.push(format!("docAuthor: {}", self.metadata.author));
        lines.push(format!("createdDate: {}", self.metadata.date));
        lines.push("---".into());
        lines.push(String::new());
        lines.push("# Test Report - SRVP Functional Requirements".into());
        lines.push(String::new());
        lines.push(
            "This document summarizes the latest test run and the verification status \
             of the SRVP functional requirements."
                .into(),
        );
        lines.push(String::new());

        lines.push("## Summary".into());
        lines.push(String::new());
        let t = &self.tests;
        lines.push(format!(
            "- Tests: {} passed, {} failed, {} skipped (total {})",
            t.passed, t.failed, t.skipped, t.total
        ));
        let r = &self.requirements;
        lines.push(format!(
            "- Requirements: {} verified, {} failed, {} pending (total {})",
            r.verified, r.failed, r.pending, r.total
        ));
        lines.push(String::new());

        lines.push("## Requirements Status".into());
        lines.push(String::new());
        lines.push("| Requirement | Status | Tests |".into());
        lines.push("| --- | --- | --- |".into());
        for row in &self.rows {
            let tests: Vec<&str> = row.evidence.iter().map(|e| e.test_id.as_str()).collect();
            lines.push(format!(
                "| {} | {} | {} |",
                row.id,
                row.status.label(),
                tests.join(", ")
            ));
        }
        lines.push(String::new());

        lines.push("## Details".into());
        lines.push(String::new());
        for row in &self.rows {
            lines.push(format!("### {}", row.id));
            lines.push(String::new());
            lines.push(format!("- Status: {}", row.status.label()));
            lines.push("- Tests:".into());
            for evidence in &row.evidence {
                lines.push(format!(
                    "  - {} `{}` — {}",
                    outcome_marker(evidence.outcome),
                    evidence.test_id,
                    evidence.outcome
                ));
            }
            if row.evidence.is_empty() {
                lines.push("  - ➖ No tests mapped yet".into());
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

fn outcome_marker(outcome: TestOutcome) -> &'static str {
    match outcome {
        TestOutcome::Passed => "✅",
        TestOutcome::Failed => "❌",
        TestOutcome::Skipped => "➖",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{AnnotationSyntax, Annotations};
    use crate::sources::MemorySources;

    fn metadata() -> ReportMetadata {
        ReportMetadata {
            version: "1.2.3".to_string(),
            author: "Jane Roe".to_string(),
            date: "2025-09-16".to_string(),
        }
    }

    fn sample_report() -> VerificationReport {
        let scan = Annotations::extract(
            MemorySources::new().add(
                "tests/test_log.py",
                r#"
def test_rotate():
    """REQ-FUNC-LOG-010"""

def test_flush():
    """REQ-FUNC-LOG-010 REQ-FUNC-LOG-011"""

def test_skip():
    """REQ-FUNC-LOG-012"""
"#,
            ),
            &AnnotationSyntax::python(),
        )
        .unwrap();
        let associations = Associations::build(&scan.annotations);
        let outcomes = OutcomeStore::from_records([
            ("tests/test_log.py::test_rotate", "passed"),
            ("tests/test_log.py::test_flush", "failed"),
            ("tests/test_log.py::test_skip", "skipped"),
            ("tests/test_other.py::test_unmapped", "passed"),
        ]);
        let doc_ids = [
            RequirementId::parse("REQ-DOC-ONLY-001").unwrap(),
            RequirementId::parse("REQ-FUNC-LOG-010").unwrap(),
        ];
        let universe = RequirementUniverse::new(&associations, &doc_ids);
        VerificationReport::compute(
            &universe,
            &associations,
            &outcomes,
            metadata(),
            DocumentInfo::default(),
        )
    }

    #[test]
    fn counts_tests_and_requirements() {
        let report = sample_report();
        assert_eq!(
            report.tests,
            OutcomeCounts {
                total: 4,
                passed: 2,
                failed: 1,
                skipped: 1,
            }
        );
        assert_eq!(
            report.requirements,
            RequirementCounts {
                total: 4,
                verified: 0,
                failed: 2,
                pending: 2,
            }
        );
        assert!(report.has_failures());
        let failed: Vec<&str> = report.failed_requirements().map(|r| r.id.as_str()).collect();
        assert_eq!(failed, ["REQ-FUNC-LOG-010", "REQ-FUNC-LOG-011"]);
    }

    #[test]
    fn renders_front_matter_first() {
        let rendered = sample_report().render_markdown();
        assert!(rendered.starts_with(
            "---\n\
             docType: Software Requirements Verification Plan Report (SRVPR)\n\
             docSubtitle: CAN Frame Retransmission Tool\n\
             docVersion: 1.2.3\n\
             docAuthor: Jane Roe\n\
             createdDate: 2025-09-16\n\
             ---\n"
        ));
    }

    #[test]
    fn renders_summary_table_and_details() {
        let rendered = sample_report().render_markdown();

        assert!(rendered.contains("- Tests: 2 passed, 1 failed, 1 skipped (total 4)"));
        assert!(rendered.contains("- Requirements: 0 verified, 2 failed, 2 pending (total 4)"));
        assert!(rendered.contains(
            "| REQ-FUNC-LOG-010 | [x] Failed | tests/test_log.py::test_rotate, tests/test_log.py::test_flush |"
        ));
        assert!(rendered.contains("| REQ-DOC-ONLY-001 | [ ] Not Started |  |"));
        assert!(rendered.contains("  - ✅ `tests/test_log.py::test_rotate` — passed"));
        assert!(rendered.contains("  - ❌ `tests/test_log.py::test_flush` — failed"));
        assert!(rendered.contains("  - ➖ `tests/test_log.py::test_skip` — skipped"));
        assert!(rendered.contains(
            "### REQ-DOC-ONLY-001\n\n- Status: [ ] Not Started\n- Tests:\n  - ➖ No tests mapped yet\n"
        ));
    }

    #[test]
    fn rows_are_sorted_and_cover_the_union() {
        let report = sample_report();
        let ids: Vec<&str> = report.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "REQ-DOC-ONLY-001",
                "REQ-FUNC-LOG-010",
                "REQ-FUNC-LOG-011",
                "REQ-FUNC-LOG-012"
            ]
        );
        let rendered = report.render_markdown();
        let table_rows = rendered.lines().filter(|l| l.starts_with("| REQ-")).count();
        assert_eq!(table_rows, 4);
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(
            sample_report().render_markdown(),
            sample_report().render_markdown()
        );
    }
}
