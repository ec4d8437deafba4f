//! Submission parsing: extraction, HTML normalization and flattening.

mod extractor;
mod flattener;
mod normalizer;
mod options;
mod style;
pub mod uudecode;

pub use extractor::{extract_document, DocumentExtractor, DocumentTarget};
pub use flattener::{flatten_html, TextFlattener};
pub use normalizer::{normalize_html, prepare_html, HtmlNormalizer};
pub use options::{ErrorMode, NoiseRegion, ParseOptions, TableFilter};
pub use style::{Indent, StyleRules};
