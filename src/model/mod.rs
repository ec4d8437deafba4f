//! Data model for submission content.
//!
//! These types carry a submission from the raw container through extraction,
//! normalization and flattening. Side tables hold extracted tables and images;
//! the flattened stream keeps its line classification explicit until it is
//! serialized for reflow.

mod extracted;
mod line;
mod placeholder;
mod submission;

pub use extracted::ExtractedDocument;
pub use line::{bold_header, FlatLine, FlatStream, LineKind, PAGE_BREAK_MARKER, TAB_PREFIX};
pub use placeholder::{ImageEntry, NormalizedDocument, PlaceholderId, PlaceholderKind, TableEntry};
pub use submission::{parse_header_date, EmbeddedDocument, Metadata, Submission};
