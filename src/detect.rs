//! Submission format detection and validation.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Submission container information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFormat {
    /// Number of `<DOCUMENT>` blocks in the container
    pub document_count: usize,
    /// Whether the container carries a `<SEC-HEADER>` block
    pub has_sec_header: bool,
}

impl std::fmt::Display for SubmissionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SGML submission ({} documents)", self.document_count)
    }
}

/// Document boundary marker of the SGML container.
pub const DOCUMENT_MARKER: &str = "<DOCUMENT>";
const SEC_HEADER_MARKER: &str = "<SEC-HEADER>";
const BOM: char = '\u{FEFF}';

/// Strip a leading UTF-8 byte-order mark.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(BOM).unwrap_or(text)
}

/// Read a submission file as UTF-8, tolerating a byte-order mark.
pub fn read_submission<P: AsRef<Path>>(path: P) -> Result<String> {
    let content = fs::read_to_string(path)?;
    Ok(match content.strip_prefix(BOM) {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Read a submission file asynchronously.
#[cfg(feature = "async")]
pub async fn read_submission_async<P: AsRef<Path>>(path: P) -> Result<String> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(strip_bom(&content).to_string())
}

/// Detect the submission format from text.
///
/// # Returns
/// * `Ok(SubmissionFormat)` if the text contains at least one document block
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_str(text: &str) -> Result<SubmissionFormat> {
    let text = strip_bom(text);
    let document_count = text.matches(DOCUMENT_MARKER).count();
    if document_count == 0 {
        return Err(Error::UnknownFormat);
    }

    Ok(SubmissionFormat {
        document_count,
        has_sec_header: text.contains(SEC_HEADER_MARKER),
    })
}

/// Detect the submission format from a file path.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SubmissionFormat> {
    let content = read_submission(path)?;
    detect_format_from_str(&content)
}

/// Check if a file is an SGML submission.
pub fn is_submission<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if text is an SGML submission.
pub fn is_submission_str(text: &str) -> bool {
    detect_format_from_str(text).is_ok()
}
