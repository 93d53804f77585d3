//! Report metadata and the per-field fallback chain
//!
//! Each front matter field is resolved from an ordered list of candidate
//! sources. A source that errors or has nothing to offer is skipped and the
//! next one is consulted; the chain ends in a fixed sentinel, so resolution
//! itself never fails.

use eyre::Result;
use facet::Facet;

/// Version used when no source yields one
pub const UNKNOWN_VERSION: &str = "0.0.0";
/// Author used when no source yields one
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Front matter fields resolved once per run
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ReportMetadata {
    pub version: String,
    pub author: String,
    /// ISO-8601 calendar date, `YYYY-MM-DD`
    pub date: String,
}

/// One candidate source for a metadata field
pub trait MetadataSource {
    /// Short description used in diagnostics, e.g. `env RELEASE_AUTHOR`
    fn name(&self) -> String;

    /// `Ok(None)` when the source is simply absent; `Err` when consulting it
    /// failed. Both fall through to the next source.
    fn lookup(&self) -> Result<Option<String>>;
}

/// Closure-backed source, handy for fixed values and tests
pub struct FnSource<F> {
    name: String,
    lookup: F,
}

impl<F> FnSource<F>
where
    F: Fn() -> Result<Option<String>>,
{
    pub fn new(name: impl Into<String>, lookup: F) -> Self {
        Self {
            name: name.into(),
            lookup,
        }
    }
}

impl<F> MetadataSource for FnSource<F>
where
    F: Fn() -> Result<Option<String>>,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    fn lookup(&self) -> Result<Option<String>> {
        (self.lookup)()
    }
}

/// A source that was consulted and passed over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub source: String,
    /// `None` when the source was absent, otherwise the error message
    pub error: Option<String>,
}

/// Outcome of resolving one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub value: String,
    /// Name of the winning source, or `None` if the sentinel was used
    pub source: Option<String>,
    /// Sources consulted before the winner, in order
    pub skipped: Vec<SkippedSource>,
}

/// Ordered fallback chain for one field
pub struct FallbackChain<'a> {
    sources: Vec<Box<dyn MetadataSource + 'a>>,
    sentinel: String,
}

impl<'a> FallbackChain<'a> {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sources: Vec::new(),
            sentinel: sentinel.into(),
        }
    }

    /// Append a source; earlier sources take precedence
    pub fn then(mut self, source: impl MetadataSource + 'a) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Consult sources in order and return the first non-blank value
    /// (trimmed), or the sentinel.
    pub fn resolve(&self) -> Resolution {
        let mut skipped = Vec::new();
        for source in &self.sources {
            match source.lookup() {
                Ok(Some(value)) if !value.trim().is_empty() => {
                    return Resolution {
                        value: value.trim().to_string(),
                        source: Some(source.name()),
                        skipped,
                    };
                }
                Ok(_) => skipped.push(SkippedSource {
                    source: source.name(),
                    error: None,
                }),
                Err(e) => skipped.push(SkippedSource {
                    source: source.name(),
                    error: Some(format!("{e:#}")),
                }),
            }
        }
        Resolution {
            value: self.sentinel.clone(),
            source: None,
            skipped,
        }
    }
}

/// Read `key: value` from a leading `---` front matter block.
///
/// Returns `None` if the text has no front matter or the key is absent or
/// empty.
pub fn front_matter_value(text: &str, key: &str) -> Option<String> {
    let mut lines = text.lines();
    if lines.next()?.trim_end() != "---" {
        return None;
    }
    for line in lines {
        if line.trim_end() == "---" {
            break;
        }
        let Some((k, v)) = line.split_once(':') else {
            continue;
        };
        if k.trim() == key {
            let v = v.trim();
            return (!v.is_empty()).then(|| v.to_string());
        }
    }
    None
}
