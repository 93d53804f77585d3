//! Requirement-to-test associations and the requirement universe

use crate::lexer::Annotations;
use crate::req_id::RequirementId;
use std::collections::{BTreeSet, HashMap};

/// Mapping from requirement ID to the tests whose documentation mentions it.
///
/// Test IDs per requirement keep first-seen order (file, then declaration)
/// and never repeat.
#[derive(Debug, Clone, Default)]
pub struct Associations {
    tests_by_requirement: HashMap<RequirementId, Vec<String>>,
}

impl Associations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold annotations, in order, into the association map
    pub fn build(annotations: &Annotations) -> Self {
        let mut associations = Self::new();
        for annotation in &annotations.annotations {
            for requirement in &annotation.requirements {
                associations.insert(requirement.clone(), &annotation.test_id);
            }
        }
        associations
    }

    /// Record that `test_id` verifies `requirement`; a known pair is kept
    /// once, at its first position.
    pub fn insert(&mut self, requirement: RequirementId, test_id: &str) {
        let tests = self.tests_by_requirement.entry(requirement).or_default();
        if !tests.iter().any(|t| t == test_id) {
            tests.push(test_id.to_string());
        }
    }

    /// Tests associated with a requirement; empty if none.
    pub fn tests_for(&self, requirement: &RequirementId) -> &[String] {
        self.tests_by_requirement
            .get(requirement)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Requirements with at least one associated test
    pub fn requirements(&self) -> impl Iterator<Item = &RequirementId> {
        self.tests_by_requirement.keys()
    }

    pub fn len(&self) -> usize {
        self.tests_by_requirement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests_by_requirement.is_empty()
    }
}

/// Every requirement to report on: associated requirements plus those
/// declared in documents. Iterates in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementUniverse {
    ids: BTreeSet<RequirementId>,
}

impl RequirementUniverse {
    pub fn new<'a>(
        associations: &Associations,
        document_ids: impl IntoIterator<Item = &'a RequirementId>,
    ) -> Self {
        let ids = associations
            .requirements()
            .chain(document_ids)
            .cloned()
            .collect();
        Self { ids }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequirementId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
