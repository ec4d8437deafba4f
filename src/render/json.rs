//! JSON rendering for converted filings.

use crate::error::Result;

use super::ParsedFiling;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a filing to JSON. Table markup and image bytes are left out.
pub fn to_json(filing: &ParsedFiling, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(filing)?,
        JsonFormat::Compact => serde_json::to_string(filing)?,
    };
    Ok(json)
}
