//! Test outcomes and the result-feed index

use eyre::{Result, WrapErr};
use facet::Facet;
use std::collections::BTreeMap;
use std::path::Path;

/// Result of executing one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum TestOutcome {
    Passed,
    Failed,
    Skipped,
}

impl TestOutcome {
    /// Parse a feed outcome label. Anything other than `passed` or `failed`
    /// (`skipped`, `xfailed`, `error`, ...) counts as skipped.
    pub fn parse(s: &str) -> Self {
        match s {
            "passed" => TestOutcome::Passed,
            "failed" => TestOutcome::Failed,
            _ => TestOutcome::Skipped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestOutcome::Passed => "passed",
            TestOutcome::Failed => "failed",
            TestOutcome::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record of the result feed (pytest-json-report layout).
#[derive(Debug, Clone, Facet)]
pub struct FeedRecord {
    /// Fully-qualified test identifier, e.g. `tests/test_log.py::test_rotate`
    pub nodeid: String,
    /// Outcome label as written by the test harness
    pub outcome: String,
}

/// The result feed document. Fields other than `tests` are ignored.
#[derive(Debug, Clone, Facet)]
pub struct ResultFeed {
    #[facet(default)]
    pub tests: Vec<FeedRecord>,
}

/// Outcome counts over a whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Facet)]
pub struct OutcomeCounts {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Read-only index from test identifier to outcome, built once per run.
#[derive(Debug, Clone, Default)]
pub struct OutcomeStore {
    outcomes: BTreeMap<String, TestOutcome>,
}

impl OutcomeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(test id, outcome label)` records. A later record for the
    /// same test id replaces an earlier one.
    pub fn from_records<I, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let outcomes = records
            .into_iter()
            .map(|(id, outcome)| (id.into(), TestOutcome::parse(outcome.as_ref())))
            .collect();
        Self { outcomes }
    }

    /// Parse a result feed from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let feed: ResultFeed =
            facet_json::from_str(json).wrap_err("Failed to parse test result feed JSON")?;
        Ok(Self::from_records(
            feed.tests.into_iter().map(|r| (r.nodeid, r.outcome)),
        ))
    }

    /// Load a result feed from a file. A missing or malformed feed is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read test result feed from {}", path.display()))?;
        Self::from_json(&content)
            .wrap_err_with(|| format!("Failed to parse test result feed from {}", path.display()))
    }

    /// Outcome of a test; tests absent from the feed count as skipped.
    pub fn outcome_of(&self, test_id: &str) -> TestOutcome {
        self.outcomes
            .get(test_id)
            .copied()
            .unwrap_or(TestOutcome::Skipped)
    }

    /// Whether the feed contains this test.
    pub fn contains(&self, test_id: &str) -> bool {
        self.outcomes.contains_key(test_id)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts {
            total: self.outcomes.len(),
            ..OutcomeCounts::default()
        };
        for outcome in self.outcomes.values() {
            match outcome {
                TestOutcome::Passed => counts.passed += 1,
                TestOutcome::Failed => counts.failed += 1,
                TestOutcome::Skipped => counts.skipped += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"{
        "created": 1726480692.1,
        "duration": 0.42,
        "exitcode": 1,
        "summary": {"passed": 2, "failed": 1, "total": 4},
        "tests": [
            {"nodeid": "tests/test_log.py::test_rotate", "lineno": 3, "outcome": "passed"},
            {"nodeid": "tests/test_log.py::test_flush", "lineno": 9, "outcome": "failed"},
            {"nodeid": "tests/test_can.py::test_frame", "lineno": 1, "outcome": "skipped"},
            {"nodeid": "tests/test_can.py::test_bus", "lineno": 7, "outcome": "xfailed"}
        ]
    }"#;

    #[test]
    fn parses_feed_and_ignores_extra_fields() {
        let store = OutcomeStore::from_json(FEED).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(
            store.outcome_of("tests/test_log.py::test_rotate"),
            TestOutcome::Passed
        );
        assert_eq!(
            store.outcome_of("tests/test_log.py::test_flush"),
            TestOutcome::Failed
        );
    }

    #[test]
    fn unknown_outcome_labels_count_as_skipped() {
        let store = OutcomeStore::from_json(FEED).unwrap();
        assert_eq!(
            store.outcome_of("tests/test_can.py::test_bus"),
            TestOutcome::Skipped
        );
        assert_eq!(TestOutcome::parse("error"), TestOutcome::Skipped);
    }

    #[test]
    fn absent_test_defaults_to_skipped() {
        let store = OutcomeStore::from_json(FEED).unwrap();
        assert!(!store.contains("tests/test_missing.py::test_nothing"));
        assert_eq!(
            store.outcome_of("tests/test_missing.py::test_nothing"),
            TestOutcome::Skipped
        );
    }

    #[test]
    fn counts_by_outcome() {
        let store = OutcomeStore::from_json(FEED).unwrap();
        assert_eq!(
            store.counts(),
            OutcomeCounts {
                total: 4,
                passed: 1,
                failed: 1,
                skipped: 2,
            }
        );
    }

    #[test]
    fn feed_without_tests_is_empty() {
        let store = OutcomeStore::from_json(r#"{"exitcode": 5}"#).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_feed_is_an_error() {
        assert!(OutcomeStore::from_json("not json").is_err());
        assert!(OutcomeStore::from_json(r#"{"tests": [{"outcome": "passed"}]}"#).is_err());
    }

    #[test]
    fn missing_feed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = OutcomeStore::load(dir.path().join("report.json")).unwrap_err();
        assert!(format!("{err:#}").contains("report.json"));
    }
}
