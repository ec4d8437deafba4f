//! Tagged output of the text flattener.
//!
//! Each [`FlatLine`] is one text piece produced by the tree walk. The plain-text
//! convention (`\t\t` prefixes, `**` wrapping, the page-break literal) is only
//! applied when the stream is serialized with [`FlatStream::to_text`], so the
//! classification stays checkable up to the reflow boundary.

use serde::{Deserialize, Serialize};

use super::PlaceholderId;

/// Literal marker emitted for a forced page break.
pub const PAGE_BREAK_MARKER: &str = "--- PAGE BREAK ----";

/// Prefix marking tabular or indented lines.
pub const TAB_PREFIX: &str = "\t\t";

/// One piece of flattened text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatLine {
    /// Loose text outside any paragraph or row
    Text(String),
    /// A paragraph; serialized with a leading newline
    Paragraph(String),
    /// A paragraph with a positive first-line indent
    Indented(String),
    /// A table row that survived table extraction
    TableRow(String),
    /// A paragraph whose indent style could not be evaluated
    Unformatted(String),
    /// An element made bold through its style attribute
    BoldHeader(String),
    /// A forced page break, followed by the element's own text
    PageBreak(String),
    /// A table or image placeholder marker
    Placeholder(PlaceholderId),
}

/// Kind of a flattened line, without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Text,
    Paragraph,
    Indented,
    TableRow,
    Unformatted,
    BoldHeader,
    PageBreak,
    Placeholder,
}

impl FlatLine {
    /// The kind tag of this line.
    pub fn kind(&self) -> LineKind {
        match self {
            FlatLine::Text(_) => LineKind::Text,
            FlatLine::Paragraph(_) => LineKind::Paragraph,
            FlatLine::Indented(_) => LineKind::Indented,
            FlatLine::TableRow(_) => LineKind::TableRow,
            FlatLine::Unformatted(_) => LineKind::Unformatted,
            FlatLine::BoldHeader(_) => LineKind::BoldHeader,
            FlatLine::PageBreak(_) => LineKind::PageBreak,
            FlatLine::Placeholder(_) => LineKind::Placeholder,
        }
    }

    /// Serialize to the plain-text convention.
    pub fn serialize(&self) -> String {
        match self {
            FlatLine::Text(text) | FlatLine::Unformatted(text) => text.clone(),
            FlatLine::Paragraph(text) => format!("\n{}", text),
            FlatLine::Indented(text) | FlatLine::TableRow(text) => {
                format!("{}{}", TAB_PREFIX, text)
            }
            FlatLine::BoldHeader(text) => bold_header(text),
            FlatLine::PageBreak(text) => format!("{}{}", PAGE_BREAK_MARKER, text),
            FlatLine::Placeholder(id) => format!("\n{}\n", id.marker()),
        }
    }
}

/// Text of a style-bold element: bracketed with markers, on a fresh line.
pub fn bold_header(text: &str) -> String {
    format!("\n** {} ** ", text)
}

/// Ordered sequence of flattened lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatStream {
    lines: Vec<FlatLine>,
}

impl FlatStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    pub fn push(&mut self, line: FlatLine) {
        self.lines.push(line);
    }

    /// The lines in order.
    pub fn lines(&self) -> &[FlatLine] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the stream is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Count lines of a given kind.
    pub fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|l| l.kind() == kind).count()
    }

    /// Serialize every line and join them with newlines.
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(FlatLine::serialize)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize with no separators, as an element's inner text.
    pub fn to_inline_text(&self) -> String {
        self.lines.iter().map(FlatLine::serialize).collect()
    }
}
