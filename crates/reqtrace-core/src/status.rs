//! Requirement status resolution

use crate::association::Associations;
use crate::outcome::{OutcomeStore, TestOutcome};
use crate::req_id::RequirementId;
use facet::Facet;

/// Verification status of one requirement, recomputed on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum RequirementStatus {
    /// Every associated test passed
    Verified,
    /// At least one associated test failed
    Failed,
    /// No associated tests, or not all of them passed
    NotStarted,
}

impl RequirementStatus {
    /// Status cell as written in the report, e.g. `[x] Verified`
    pub fn label(&self) -> &'static str {
        match self {
            RequirementStatus::Verified => "[x] Verified",
            RequirementStatus::Failed => "[x] Failed",
            RequirementStatus::NotStarted => "[ ] Not Started",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementStatus::Verified => "verified",
            RequirementStatus::Failed => "failed",
            RequirementStatus::NotStarted => "not-started",
        }
    }
}

impl std::fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the status of a requirement from its tests' outcomes.
///
/// Rules, first match wins: no tests is `NotStarted`; any failure is
/// `Failed`; all passed is `Verified`; anything else (passed mixed with
/// skipped, or all skipped) is `NotStarted`.
pub fn resolve(
    requirement: &RequirementId,
    associations: &Associations,
    outcomes: &OutcomeStore,
) -> RequirementStatus {
    resolve_outcomes(
        associations
            .tests_for(requirement)
            .iter()
            .map(|test_id| outcomes.outcome_of(test_id)),
    )
}

/// Resolve a status from an outcome sequence.
pub fn resolve_outcomes(outcomes: impl IntoIterator<Item = TestOutcome>) -> RequirementStatus {
    let mut any = false;
    let mut all_passed = true;
    for outcome in outcomes {
        any = true;
        match outcome {
            TestOutcome::Failed => return RequirementStatus::Failed,
            TestOutcome::Passed => {}
            TestOutcome::Skipped => all_passed = false,
        }
    }

    if any && all_passed {
        RequirementStatus::Verified
    } else {
        RequirementStatus::NotStarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TestOutcome::*;

    #[test]
    fn empty_outcomes_are_not_started() {
        assert_eq!(resolve_outcomes([]), RequirementStatus::NotStarted);
    }

    #[test]
    fn failure_dominates() {
        assert_eq!(
            resolve_outcomes([Passed, Failed, Skipped]),
            RequirementStatus::Failed
        );
        assert_eq!(resolve_outcomes([Skipped, Failed]), RequirementStatus::Failed);
    }

    #[test]
    fn all_passed_is_verified() {
        assert_eq!(resolve_outcomes([Passed, Passed]), RequirementStatus::Verified);
        assert_eq!(resolve_outcomes([Passed]), RequirementStatus::Verified);
    }

    #[test]
    fn passed_mixed_with_skipped_is_not_started() {
        assert_eq!(
            resolve_outcomes([Passed, Skipped]),
            RequirementStatus::NotStarted
        );
        assert_eq!(
            resolve_outcomes([Skipped, Skipped]),
            RequirementStatus::NotStarted
        );
    }

    #[test]
    fn resolve_uses_associations_and_store() {
        let req = RequirementId::parse("REQ-FUNC-LOG-010").unwrap();
        let mut assoc = Associations::new();
        assoc.insert(req.clone(), "tests/test_log.py::test_rotate");
        assoc.insert(req.clone(), "tests/test_log.py::test_flush");

        let store = OutcomeStore::from_records([
            ("tests/test_log.py::test_rotate", "passed"),
            ("tests/test_log.py::test_flush", "passed"),
        ]);
        assert_eq!(resolve(&req, &assoc, &store), RequirementStatus::Verified);

        // Absent from the feed counts as skipped
        let partial = OutcomeStore::from_records([("tests/test_log.py::test_rotate", "passed")]);
        assert_eq!(resolve(&req, &assoc, &partial), RequirementStatus::NotStarted);

        // Repeated calls with identical inputs give identical results
        assert_eq!(
            resolve(&req, &assoc, &partial),
            resolve(&req, &assoc, &partial)
        );
    }

    #[test]
    fn requirement_without_tests_is_not_started() {
        let req = RequirementId::parse("REQ-DOC-ONLY-001").unwrap();
        let store = OutcomeStore::from_records([("tests/test_a.py::test_x", "passed")]);
        assert_eq!(
            resolve(&req, &Associations::new(), &store),
            RequirementStatus::NotStarted
        );
    }
}
