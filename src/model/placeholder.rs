//! Placeholder markers and the side tables they point into.

use serde::{Deserialize, Serialize};

/// Kind of content a placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    /// An extracted data table
    Table,
    /// An inline image
    Image,
}

impl PlaceholderKind {
    fn label(self) -> &'static str {
        match self {
            PlaceholderKind::Table => "TABLE_PLACEHOLDER",
            PlaceholderKind::Image => "IMAGE_PLACEHOLDER",
        }
    }
}

/// Synthetic identifier of an extracted table or image.
///
/// Tables are `table_<n>` with `n` counting from 1; images are
/// `image_<src>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceholderId {
    kind: PlaceholderKind,
    id: String,
}

impl PlaceholderId {
    /// Identifier of the `n`-th kept table.
    pub fn table(n: usize) -> Self {
        Self {
            kind: PlaceholderKind::Table,
            id: format!("table_{}", n),
        }
    }

    /// Identifier of an image by its `src` attribute.
    pub fn image(src: &str) -> Self {
        Self {
            kind: PlaceholderKind::Image,
            id: format!("image_{}", src),
        }
    }

    /// Placeholder kind.
    pub fn kind(&self) -> PlaceholderKind {
        self.kind
    }

    /// The identifier string.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// The textual marker, e.g. `--- TABLE_PLACEHOLDER: table_1 ---`.
    pub fn marker(&self) -> String {
        format!("--- {}: {} ---", self.kind.label(), self.id)
    }

    /// Markup substituted into the HTML: an inline element wrapping the
    /// marker on its own line.
    pub fn html_marker(&self) -> String {
        format!("<i>\n{}\n</i>", self.marker())
    }

    /// Recognize a marker line (surrounding whitespace allowed).
    pub fn parse_marker(text: &str) -> Option<Self> {
        let inner = text.trim().strip_prefix("--- ")?.strip_suffix(" ---")?;
        let (label, id) = inner.split_once(": ")?;
        let kind = match label {
            "TABLE_PLACEHOLDER" => PlaceholderKind::Table,
            "IMAGE_PLACEHOLDER" => PlaceholderKind::Image,
            _ => return None,
        };
        if id.is_empty() || id.contains('\n') {
            return None;
        }
        Some(Self {
            kind,
            id: id.to_string(),
        })
    }
}

impl std::fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// An extracted table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableEntry {
    /// Placeholder identifier
    pub id: PlaceholderId,

    /// Raw `<table>...</table>` markup
    #[serde(skip_serializing, default)]
    pub markup: String,

    /// Number of row-end tags in the markup
    pub row_count: usize,
}

/// An extracted image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Placeholder identifier
    pub id: PlaceholderId,

    /// The `src` attribute as written in the markup
    pub src: String,

    /// Decoded image bytes, serialized as their length
    #[serde(rename = "size", serialize_with = "serialize_len", skip_deserializing)]
    pub data: Vec<u8>,
}

fn serialize_len<S: serde::Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(data.len() as u64)
}

impl ImageEntry {
    /// Size of the decoded data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// MIME type guessed from the file extension.
    pub fn mime_type(&self) -> &'static str {
        let ext = self
            .src
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tif" | "tiff" => "image/tiff",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        }
    }
}

/// HTML with noise removed and tables/images replaced by placeholder markers.
#[derive(Debug, Clone, Default)]
pub struct NormalizedDocument {
    /// Normalized HTML text
    pub html: String,

    /// Kept tables, in placeholder order
    pub tables: Vec<TableEntry>,

    /// Resolved images, one entry per distinct `src`
    pub images: Vec<ImageEntry>,

    /// Number of `<table>` spans seen before filtering
    pub raw_table_count: usize,

    /// Number of `<img>` tags replaced
    pub image_tag_count: usize,
}

impl NormalizedDocument {
    /// Look up a table by identifier.
    pub fn table(&self, id: &str) -> Option<&TableEntry> {
        self.tables.iter().find(|t| t.id.as_str() == id)
    }

    /// Look up an image by identifier.
    pub fn image(&self, id: &str) -> Option<&ImageEntry> {
        self.images.iter().find(|i| i.id.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_marker() {
        let id = PlaceholderId::table(3);
        assert_eq!(id.as_str(), "table_3");
        assert_eq!(id.marker(), "--- TABLE_PLACEHOLDER: table_3 ---");
        assert_eq!(
            id.html_marker(),
            "<i>\n--- TABLE_PLACEHOLDER: table_3 ---\n</i>"
        );
    }

    #[test]
    fn test_image_marker_roundtrip() {
        let id = PlaceholderId::image("logo.jpg");
        assert_eq!(id.marker(), "--- IMAGE_PLACEHOLDER: image_logo.jpg ---");
        let parsed = PlaceholderId::parse_marker("\n--- IMAGE_PLACEHOLDER: image_logo.jpg ---\n");
        assert_eq!(parsed, Some(id));
    }

    #[test]
    fn test_parse_marker_rejects_other_text() {
        assert!(PlaceholderId::parse_marker("--- PAGE BREAK ----").is_none());
        assert!(PlaceholderId::parse_marker("plain text").is_none());
    }

    #[test]
    fn test_image_mime_type() {
        let entry = ImageEntry {
            id: PlaceholderId::image("chart.JPG"),
            src: "chart.JPG".into(),
            data: vec![1, 2, 3],
        };
        assert_eq!(entry.mime_type(), "image/jpeg");
        assert_eq!(entry.size(), 3);
    }

    #[test]
    fn test_image_serializes_size_not_bytes() {
        let entry = ImageEntry {
            id: PlaceholderId::image("logo.png"),
            src: "logo.png".into(),
            data: vec![0; 42],
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"size\":42"));
        assert!(!json.contains("\"data\""));
    }
}
