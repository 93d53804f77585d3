//! Requirement identifier grammar
//!
//! A requirement ID is `REQ-` followed by one or more `[A-Z]+-` segments and
//! exactly three decimal digits, e.g. `REQ-FUNC-LOG-010`. The same matcher is
//! used for document text and for test annotations.

use facet::Facet;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

const PREFIX: &str = "REQ-";
const DIGITS: usize = 3;

/// A requirement identifier. Opaque and case-sensitive; equality is exact
/// string equality and ordering is lexicographic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct RequirementId(String);

impl RequirementId {
    /// Parse a whole string as a requirement ID.
    pub fn parse(s: &str) -> Option<Self> {
        (match_len(s.as_bytes()) == Some(s.len())).then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RequirementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequirementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for RequirementId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Length of the requirement ID starting at the beginning of `input`, if any.
///
/// Segments are letters and the terminal group is digits, so the match is
/// decided without backtracking. Three digits followed by a fourth digit are
/// a near-match and rejected.
fn match_len(input: &[u8]) -> Option<usize> {
    if !input.starts_with(PREFIX.as_bytes()) {
        return None;
    }

    let mut pos = PREFIX.len();
    let mut segments = 0;

    loop {
        if segments > 0
            && input
                .get(pos..pos + DIGITS)
                .is_some_and(|d| d.iter().all(u8::is_ascii_digit))
        {
            if input.get(pos + DIGITS).is_some_and(u8::is_ascii_digit) {
                return None;
            }
            return Some(pos + DIGITS);
        }

        let segment_start = pos;
        while input.get(pos).is_some_and(u8::is_ascii_uppercase) {
            pos += 1;
        }
        if pos == segment_start || input.get(pos) != Some(&b'-') {
            return None;
        }
        pos += 1;
        segments += 1;
    }
}

/// Iterate over every requirement ID occurrence in `text`, left to right,
/// non-overlapping. Yields byte offset and matched slice.
pub fn scan_requirement_ids(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut cursor = 0;
    std::iter::from_fn(move || {
        while let Some(found) = text[cursor..].find(PREFIX) {
            let start = cursor + found;
            match match_len(&text.as_bytes()[start..]) {
                Some(len) => {
                    cursor = start + len;
                    return Some((start, &text[start..start + len]));
                }
                None => cursor = start + 1,
            }
        }
        cursor = text.len();
        None
    })
}

/// Extract the distinct requirement IDs in `text`, in first-seen order.
pub fn extract_requirement_ids(text: &str) -> Vec<RequirementId> {
    let mut seen = HashSet::new();
    scan_requirement_ids(text)
        .filter(|(_, id)| seen.insert(*id))
        .map(|(_, id)| RequirementId(id.to_string()))
        .collect()
}
