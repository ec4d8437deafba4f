//! Content returned by the document extractor.

/// A single embedded document's content.
///
/// Owned by the caller that requested it; carries no reference back to the
/// submission it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedDocument {
    /// Raw segment text (HTML, plain text, or an undecoded payload)
    Text(String),
    /// Decoded uuencoded attachment
    Binary(Vec<u8>),
}

impl ExtractedDocument {
    /// Text content, if this is a textual document.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExtractedDocument::Text(text) => Some(text),
            ExtractedDocument::Binary(_) => None,
        }
    }

    /// Binary content, if this is a decoded attachment.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ExtractedDocument::Text(_) => None,
            ExtractedDocument::Binary(data) => Some(data),
        }
    }

    /// Consume into text, if textual.
    pub fn into_text(self) -> Option<String> {
        match self {
            ExtractedDocument::Text(text) => Some(text),
            ExtractedDocument::Binary(_) => None,
        }
    }

    /// Consume into raw bytes (text documents yield their UTF-8 bytes).
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ExtractedDocument::Text(text) => text.into_bytes(),
            ExtractedDocument::Binary(data) => data,
        }
    }

    /// Whether this document was decoded from a binary envelope.
    pub fn is_binary(&self) -> bool {
        matches!(self, ExtractedDocument::Binary(_))
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        match self {
            ExtractedDocument::Text(text) => text.len(),
            ExtractedDocument::Binary(data) => data.len(),
        }
    }

    /// Whether the content is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
