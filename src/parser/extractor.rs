//! Embedded document extraction.
//!
//! Splits a submission on its `<DOCUMENT>` boundaries and returns exactly one
//! embedded document, or an error. Candidates are never merged.

use crate::detect::DOCUMENT_MARKER;
use crate::error::{Error, Result};
use crate::model::ExtractedDocument;

use super::uudecode;

/// Which embedded document to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentTarget {
    /// The primary form, declared as the first document of the container
    PrimaryForm(String),
    /// A document by its `<FILENAME>` declaration
    FileName(String),
}

impl DocumentTarget {
    /// The 10-K primary form.
    pub fn ten_k() -> Self {
        DocumentTarget::PrimaryForm("10-K".to_string())
    }
}

impl Default for DocumentTarget {
    fn default() -> Self {
        Self::ten_k()
    }
}

impl From<&str> for DocumentTarget {
    fn from(name: &str) -> Self {
        if name == "10-K" {
            DocumentTarget::ten_k()
        } else {
            DocumentTarget::FileName(name.to_string())
        }
    }
}

impl std::fmt::Display for DocumentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentTarget::PrimaryForm(form) => write!(f, "form {}", form),
            DocumentTarget::FileName(name) => write!(f, "file {}", name),
        }
    }
}

/// Extractor over one submission's raw text.
#[derive(Debug, Clone, Copy)]
pub struct DocumentExtractor<'a> {
    raw: &'a str,
}

impl<'a> DocumentExtractor<'a> {
    /// Create an extractor over raw submission text.
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// Extract the target document, decoding a uuencoded payload when
    /// `decode_binary` is set and the target is a file.
    pub fn extract(&self, target: &DocumentTarget, decode_binary: bool) -> Result<ExtractedDocument> {
        match target {
            DocumentTarget::PrimaryForm(form) => {
                Ok(ExtractedDocument::Text(self.primary_form(form)?.to_string()))
            }
            DocumentTarget::FileName(name) if decode_binary => {
                Ok(ExtractedDocument::Binary(self.binary_file(name)?))
            }
            DocumentTarget::FileName(name) => Ok(ExtractedDocument::Text(self.file(name)?.to_string())),
        }
    }

    /// The segment at index 1, if its declared type matches `form`.
    ///
    /// The canonical layout puts the primary form first, so no other segment
    /// is consulted.
    pub fn primary_form(&self, form: &str) -> Result<&'a str> {
        let segment = self.raw.split(DOCUMENT_MARKER).nth(1).ok_or_else(|| {
            Error::NotFound(format!("{} in the beginning of submission file", form))
        })?;

        let type_line = format!("<TYPE>{}", form);
        let declared = segment
            .lines()
            .any(|line| line.starts_with(type_line.as_str()));
        if !declared {
            return Err(Error::NotFound(format!(
                "{} in the beginning of submission file",
                form
            )));
        }

        Ok(segment)
    }

    /// The raw segment whose `<FILENAME>` declaration matches `name`.
    pub fn file(&self, name: &str) -> Result<&'a str> {
        self.raw
            .split(DOCUMENT_MARKER)
            .find(|segment| declares_filename(segment, name))
            .ok_or_else(|| Error::NotFound(format!("file {} in the submission file", name)))
    }

    /// Decode the uuencoded payload of the file named `name`.
    pub fn binary_file(&self, name: &str) -> Result<Vec<u8>> {
        let segment = self.file(name)?;

        let envelope = uudecode::find_envelope(segment).ok_or_else(|| Error::Decode {
            file: name.to_string(),
            reason: "no begin/end envelope".to_string(),
        })?;

        let data = uudecode::decode(envelope).map_err(|e| Error::Decode {
            file: name.to_string(),
            reason: e.to_string(),
        })?;

        log::debug!("Decoded {} ({} bytes)", name, data.len());
        Ok(data)
    }
}

fn declares_filename(segment: &str, name: &str) -> bool {
    segment.lines().any(|line| {
        line.trim_end()
            .strip_prefix("<FILENAME>")
            .is_some_and(|declared| declared.trim().eq_ignore_ascii_case(name))
    })
}

/// Extract one embedded document by logical name.
///
/// `"10-K"` selects the primary form; any other name selects a file by its
/// `<FILENAME>` declaration.
pub fn extract_document(raw: &str, name: &str, decode_binary: bool) -> Result<ExtractedDocument> {
    DocumentExtractor::new(raw).extract(&DocumentTarget::from(name), decode_binary)
}
