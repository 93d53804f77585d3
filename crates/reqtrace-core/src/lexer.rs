//! Annotation lexer for test sources
//!
//! Locates test declarations that are immediately followed by a documentation
//! block and reads requirement IDs from inside that block only. The shape of a
//! declaration is described by [`AnnotationSyntax`], so the lexer can be
//! retargeted to another test dialect without code changes.

use crate::req_id::{RequirementId, extract_requirement_ids};
use crate::sources::{ScanResult, Sources};
use eyre::Result;
use facet::Facet;

/// Opening and closing delimiters of a documentation block.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct DocDelimiter {
    pub open: String,
    pub close: String,
}

impl DocDelimiter {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// How a test declaration and its documentation block are written.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct AnnotationSyntax {
    /// Keyword that starts a declaration, e.g. `def `
    pub declaration: String,
    /// Required prefix of the declared name for it to be a test, e.g. `test_`
    pub name_prefix: String,
    /// Token that closes the declaration header, e.g. `:`
    pub header_end: String,
    /// Accepted documentation block delimiters, tried in order
    pub doc_delimiters: Vec<DocDelimiter>,
    /// Line comment marker; comments between the header and the block are
    /// skipped, e.g. `# noqa` after the header
    #[facet(default)]
    pub line_comment: Option<String>,
}

impl AnnotationSyntax {
    /// pytest functions with docstrings.
    pub fn python() -> Self {
        Self {
            declaration: "def ".to_string(),
            name_prefix: "test_".to_string(),
            header_end: ":".to_string(),
            doc_delimiters: vec![
                DocDelimiter::new("\"\"\"", "\"\"\""),
                DocDelimiter::new("'''", "'''"),
                DocDelimiter::new("r\"\"\"", "\"\"\""),
                DocDelimiter::new("r'''", "'''"),
            ],
            line_comment: Some("#".to_string()),
        }
    }
}

impl Default for AnnotationSyntax {
    fn default() -> Self {
        Self::python()
    }
}

/// A test declaration and the requirement IDs its documentation mentions.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct TestAnnotation {
    /// Synthetic test identifier, `<tests dir>/<file>::<name>`
    pub test_id: String,
    /// Declared test name
    pub name: String,
    /// Line of the declaration (1-indexed)
    pub line: usize,
    /// Requirement IDs in the documentation block, first-seen, deduplicated
    pub requirements: Vec<RequirementId>,
}

/// Annotations extracted from test sources
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    /// Every annotated test declaration, in file-then-declaration order
    pub annotations: Vec<TestAnnotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Extract annotations from any source
    pub fn extract(sources: impl Sources, syntax: &AnnotationSyntax) -> Result<ScanResult> {
        sources.scan(syntax)
    }

    /// Extract annotations from raw content (no I/O)
    pub fn extract_from_content(
        id_prefix: &str,
        content: &str,
        syntax: &AnnotationSyntax,
    ) -> (Self, Vec<String>) {
        let mut annotations = Annotations::new();
        let warnings = extract_from_content(id_prefix, content, syntax, &mut annotations);
        (annotations, warnings)
    }

    pub fn extend(&mut self, other: Annotations) {
        self.annotations.extend(other.annotations);
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Extract annotations from one file. `id_prefix` is the `<dir>/<file>` part
/// of the test identifier. Returns warnings for unterminated blocks.
pub(crate) fn extract_from_content(
    id_prefix: &str,
    content: &str,
    syntax: &AnnotationSyntax,
    out: &mut Annotations,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if syntax.declaration.is_empty() {
        return warnings;
    }

    let bytes = content.as_bytes();
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let get_line = |offset: usize| -> usize {
        match line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    };

    let mut cursor = 0;
    while let Some(found) = content[cursor..].find(&syntax.declaration) {
        let decl_start = cursor + found;
        cursor = decl_start + syntax.declaration.len();

        // The keyword must start a token (`def` but not `undef`)
        if decl_start > 0 && is_ident_byte(bytes[decl_start - 1]) {
            continue;
        }

        let name_len = bytes[cursor..]
            .iter()
            .take_while(|b| is_ident_byte(**b))
            .count();
        let name = &content[cursor..cursor + name_len];
        if name.is_empty() || !name.starts_with(&syntax.name_prefix) {
            continue;
        }

        let Some(body_start) = header_end(content, cursor + name_len, &syntax.header_end) else {
            continue;
        };
        cursor = body_start;

        let line = get_line(decl_start);
        let test_id = format!("{}::{}", id_prefix, name);

        let block = match doc_block(
            &content[body_start..],
            &syntax.doc_delimiters,
            syntax.line_comment.as_deref(),
        ) {
            DocBlock::Found(text) => text,
            DocBlock::Missing => continue,
            DocBlock::Unterminated => {
                warnings.push(format!(
                    "{}:{}: unterminated documentation block for {}",
                    id_prefix, line, name
                ));
                continue;
            }
        };

        out.annotations.push(TestAnnotation {
            test_id,
            name: name.to_string(),
            line,
            requirements: extract_requirement_ids(block),
        });
    }

    warnings
}

/// Find the end of a declaration header starting right after the name.
///
/// Skips an optional balanced parameter list (which may span lines), then
/// expects `header_end` before the end of that line.
fn header_end(content: &str, from: usize, token: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut pos = from;
    while bytes.get(pos).is_some_and(|b| *b == b' ' || *b == b'\t') {
        pos += 1;
    }

    if bytes.get(pos) == Some(&b'(') {
        let mut depth = 0usize;
        loop {
            match bytes.get(pos)? {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        pos += 1;
                        break;
                    }
                }
                _ => {}
            }
            pos += 1;
        }
    }

    let line_end = content[pos..].find('\n').map_or(content.len(), |i| pos + i);
    let found = content[pos..line_end].find(token)?;
    Some(pos + found + token.len())
}

enum DocBlock<'a> {
    Found(&'a str),
    Missing,
    Unterminated,
}

/// Read the documentation block at the start of `rest`, allowing leading
/// whitespace and line comments only.
fn doc_block<'a>(
    rest: &'a str,
    delimiters: &[DocDelimiter],
    line_comment: Option<&str>,
) -> DocBlock<'a> {
    let mut rest = rest.trim_start();
    if let Some(marker) = line_comment.filter(|m| !m.is_empty()) {
        while rest.starts_with(marker) {
            rest = rest.find('\n').map_or("", |i| &rest[i + 1..]).trim_start();
        }
    }
    for delimiter in delimiters {
        if delimiter.open.is_empty() {
            continue;
        }
        if let Some(inner) = rest.strip_prefix(delimiter.open.as_str()) {
            return match inner.find(delimiter.close.as_str()) {
                Some(end) => DocBlock::Found(&inner[..end]),
                None => DocBlock::Unterminated,
            };
        }
    }
    DocBlock::Missing
}
