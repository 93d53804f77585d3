//! reqtrace-core - Core library for requirement verification traceability
//!
//! This crate provides the building blocks for:
//! - Extracting requirement IDs (`REQ-FUNC-LOG-010`) from design documents
//! - Extracting requirement IDs from the documentation blocks of test functions
//! - Associating requirements with tests and resolving a status per requirement
//!   from a test result feed
//! - Rendering a deterministic verification report with front matter
//!
//! # Features
//!
//! - `walk` - Enable [`TestDirSources`] for gitignore-aware test discovery (brings in `ignore`, `globset`)
//! - `parallel` - Enable parallel file parsing (brings in `rayon`)
//!
//! # Requirement IDs
//!
//! IDs are `REQ-` followed by one or more uppercase segments and exactly three
//! digits. The same grammar applies to documents and test annotations:
//!
//! ```
//! use reqtrace_core::{RequirementId, extract_requirement_ids};
//!
//! assert!(RequirementId::parse("REQ-FUNC-LOG-010").is_some());
//! assert!(RequirementId::parse("REQ-FUNC-10").is_none());
//!
//! let ids = extract_requirement_ids("Covers REQ-NFR-REL-001 and REQ-FUNC-LOG-010.");
//! assert_eq!(ids.len(), 2);
//! ```
//!
//! # Reconciling test results
//!
//! ```
//! use reqtrace_core::{
//!     AnnotationSyntax, Annotations, Associations, DocumentInfo, MemorySources,
//!     OutcomeStore, ReportMetadata, RequirementStatus, RequirementUniverse,
//!     VerificationReport,
//! };
//!
//! let scan = Annotations::extract(
//!     MemorySources::new().add(
//!         "tests/test_log.py",
//!         "def test_rotate():\n    \"\"\"Verifies REQ-FUNC-LOG-010\"\"\"\n",
//!     ),
//!     &AnnotationSyntax::python(),
//! )
//! .unwrap();
//!
//! let associations = Associations::build(&scan.annotations);
//! let outcomes = OutcomeStore::from_json(
//!     r#"{"tests": [{"nodeid": "tests/test_log.py::test_rotate", "outcome": "passed"}]}"#,
//! )
//! .unwrap();
//! let universe = RequirementUniverse::new(&associations, []);
//!
//! let report = VerificationReport::compute(
//!     &universe,
//!     &associations,
//!     &outcomes,
//!     ReportMetadata {
//!         version: "1.0.0".into(),
//!         author: "Jane Roe".into(),
//!         date: "2025-09-16".into(),
//!     },
//!     DocumentInfo::default(),
//! );
//! assert_eq!(report.rows[0].status, RequirementStatus::Verified);
//! assert!(report.render_markdown().contains("| REQ-FUNC-LOG-010 | [x] Verified |"));
//! ```

mod association;
mod lexer;
pub mod metadata;
mod outcome;
mod report;
mod req_id;
mod sources;
mod status;

pub use association::{Associations, RequirementUniverse};
pub use lexer::{AnnotationSyntax, Annotations, DocDelimiter, TestAnnotation};
pub use metadata::{FallbackChain, MetadataSource, ReportMetadata, Resolution};
pub use outcome::{FeedRecord, OutcomeCounts, OutcomeStore, ResultFeed, TestOutcome};
pub use report::{DocumentInfo, Evidence, RequirementCounts, RequirementRow, VerificationReport};
pub use req_id::{RequirementId, extract_requirement_ids, scan_requirement_ids};
pub use sources::{DocumentScan, DocumentSources, MemorySources, ScanResult, Sources};
pub use status::{RequirementStatus, resolve, resolve_outcomes};

#[cfg(feature = "walk")]
pub use sources::TestDirSources;
