//! Conversion result with metadata and statistics.

use serde::{Deserialize, Serialize};

use crate::model::{FlatStream, ImageEntry, LineKind, Metadata, NormalizedDocument, TableEntry};

/// Result of converting a submission: reflowed text plus everything extracted
/// on the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFiling {
    /// The reflowed text
    pub text: String,

    /// Header metadata
    pub metadata: Metadata,

    /// Extracted tables, in placeholder order
    pub tables: Vec<TableEntry>,

    /// Resolved images
    pub images: Vec<ImageEntry>,

    /// Extraction statistics
    pub stats: ExtractionStats,
}

impl ParsedFiling {
    /// Create a new result.
    pub fn new(
        text: String,
        metadata: Metadata,
        tables: Vec<TableEntry>,
        images: Vec<ImageEntry>,
        stats: ExtractionStats,
    ) -> Self {
        Self {
            text,
            metadata,
            tables,
            images,
            stats,
        }
    }

    /// Get the text length in bytes.
    pub fn text_len(&self) -> usize {
        self.text.len()
    }

    /// Look up a table by identifier.
    pub fn table(&self, id: &str) -> Option<&TableEntry> {
        self.tables.iter().find(|t| t.id.as_str() == id)
    }

    /// Look up an image by identifier.
    pub fn image(&self, id: &str) -> Option<&ImageEntry> {
        self.images.iter().find(|i| i.id.as_str() == id)
    }
}

/// Statistics collected during conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// `<table>` spans seen before filtering
    pub raw_table_count: usize,

    /// Tables moved into the side table
    pub table_count: usize,

    /// `<img>` tags replaced by placeholders
    pub image_tag_count: usize,

    /// Images with resolved data
    pub image_count: usize,

    /// Paragraph lines, indented or not
    pub paragraph_count: usize,

    /// Table rows left in the text
    pub table_row_count: usize,

    /// Style-bold headers
    pub bold_header_count: usize,

    /// Forced page breaks
    pub page_break_count: usize,

    /// Placeholder markers reached by the flattener
    pub placeholder_count: usize,

    /// Lines in the final text
    pub line_count: usize,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: usize,

    /// Character count (excluding whitespace)
    pub char_count: usize,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record side-table counts from the normalization pass.
    pub fn record_normalized(&mut self, doc: &NormalizedDocument) {
        self.raw_table_count += doc.raw_table_count;
        self.table_count += doc.tables.len();
        self.image_tag_count += doc.image_tag_count;
        self.image_count += doc.images.len();
    }

    /// Record per-kind line counts from the flattened stream.
    pub fn record_lines(&mut self, stream: &FlatStream) {
        self.paragraph_count += stream.count(LineKind::Paragraph)
            + stream.count(LineKind::Indented)
            + stream.count(LineKind::Unformatted);
        self.table_row_count += stream.count(LineKind::TableRow);
        self.bold_header_count += stream.count(LineKind::BoldHeader);
        self.page_break_count += stream.count(LineKind::PageBreak);
        self.placeholder_count += stream.count(LineKind::Placeholder);
    }

    /// Add line, word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.line_count += text.lines().count();

        // Word count: whitespace-separated tokens
        self.word_count += text.split_whitespace().count();

        // Character count: non-whitespace characters
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count();
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.raw_table_count += other.raw_table_count;
        self.table_count += other.table_count;
        self.image_tag_count += other.image_tag_count;
        self.image_count += other.image_count;
        self.paragraph_count += other.paragraph_count;
        self.table_row_count += other.table_row_count;
        self.bold_header_count += other.bold_header_count;
        self.page_break_count += other.page_break_count;
        self.placeholder_count += other.placeholder_count;
        self.line_count += other.line_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
