//! Parsing options and configuration.

use super::extractor::DocumentTarget;

/// Options for extracting and normalizing a submission.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Which embedded document holds the report
    pub target: DocumentTarget,

    /// Regions removed before any other normalization
    pub noise_regions: Vec<NoiseRegion>,

    /// Which tables are extracted into the side table
    pub table_filter: TableFilter,

    /// Whether `<img>` sources are resolved into the image side table
    pub extract_images: bool,

    /// Fold text to ASCII (NFKD, non-ASCII dropped)
    pub fold_ascii: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (undecodable images are skipped).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the target document.
    pub fn with_target(mut self, target: DocumentTarget) -> Self {
        self.target = target;
        self
    }

    /// Replace the noise regions.
    pub fn with_noise_regions(mut self, regions: Vec<NoiseRegion>) -> Self {
        self.noise_regions = regions;
        self
    }

    /// Add a noise region.
    pub fn with_noise_region(mut self, region: NoiseRegion) -> Self {
        self.noise_regions.push(region);
        self
    }

    /// Set the table filter.
    pub fn with_table_filter(mut self, filter: TableFilter) -> Self {
        self.table_filter = filter;
        self
    }

    /// Enable or disable image resolution.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Enable or disable ASCII folding.
    pub fn with_ascii_folding(mut self, fold: bool) -> Self {
        self.fold_ascii = fold;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            target: DocumentTarget::default(),
            noise_regions: NoiseRegion::defaults(),
            table_filter: TableFilter::default(),
            extract_images: true,
            fold_ascii: true,
        }
    }
}

/// Error handling mode during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Any extraction error aborts the submission
    #[default]
    Strict,
    /// Image decode failures are logged and the image is left unresolved
    Lenient,
}

/// A span of markup removed wholesale, from `start` up to the nearest `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseRegion {
    /// Literal opening marker
    pub start: String,
    /// Literal closing marker
    pub end: String,
}

impl NoiseRegion {
    /// Create a region from literal start and end markers.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Inline-XBRL header block.
    pub fn ixbrl_header() -> Self {
        Self::new("<ix:header>", "</ix:header>")
    }

    /// Back-link anchor to the table of contents repeated on every page.
    pub fn toc_backlink() -> Self {
        Self::new("<a href=\"#TOC\"", "</a>")
    }

    /// The regions removed by default.
    pub fn defaults() -> Vec<Self> {
        vec![Self::ixbrl_header(), Self::toc_backlink()]
    }
}

/// Heuristic separating data tables from layout tables.
///
/// A table is kept when it contains any highlight marker or has at least
/// `min_rows` row-end tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFilter {
    /// Markers matched case-insensitively (e.g. a highlight background color)
    pub highlight_markers: Vec<String>,
    /// Minimum number of `</tr>` tags
    pub min_rows: usize,
}

impl TableFilter {
    /// Create a filter.
    pub fn new(highlight_markers: Vec<String>, min_rows: usize) -> Self {
        Self {
            highlight_markers,
            min_rows,
        }
    }

    /// Set the minimum row count.
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Add a highlight marker.
    pub fn with_highlight_marker(mut self, marker: impl Into<String>) -> Self {
        self.highlight_markers.push(marker.into());
        self
    }

    /// Decide whether a table span is kept.
    pub fn keeps(&self, markup: &str, row_count: usize) -> bool {
        if row_count >= self.min_rows {
            return true;
        }
        let lower = markup.to_ascii_lowercase();
        self.highlight_markers
            .iter()
            .any(|marker| lower.contains(&marker.to_ascii_lowercase()))
    }
}

impl Default for TableFilter {
    fn default() -> Self {
        Self {
            highlight_markers: vec!["#cceeff".to_string()],
            min_rows: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .lenient()
            .with_images(false)
            .with_table_filter(TableFilter::default().with_min_rows(5))
            .with_noise_region(NoiseRegion::new("<div class=\"footer\"", "</div>"));

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(!options.extract_images);
        assert_eq!(options.table_filter.min_rows, 5);
        assert_eq!(options.noise_regions.len(), 3);
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.fold_ascii);
        assert_eq!(options.noise_regions, NoiseRegion::defaults());
        assert_eq!(options.target, DocumentTarget::PrimaryForm("10-K".into()));
    }

    #[test]
    fn test_table_filter_rows() {
        let filter = TableFilter::default();
        assert!(filter.keeps("<table></table>", 10));
        assert!(!filter.keeps("<table></table>", 9));
    }

    #[test]
    fn test_table_filter_highlight_case_insensitive() {
        let filter = TableFilter::default();
        assert!(filter.keeps("<table><tr style=\"background:#CCEEFF\"></tr></table>", 1));
    }
}
