//! Management's Discussion & Analysis extraction.
//!
//! Locating the section boundaries is left to an [`MdaLocator`]. This module
//! prepares the text, retries past a table-of-contents hit and persists the
//! result.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::output::write_content;
use crate::render::normalize_text;

/// Spans shorter than this (UTF-8 bytes) are assumed to be an index entry.
pub const MIN_MDA_BYTES: usize = 1000;

/// A located MD&A span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdaMatch {
    /// Section text
    pub text: String,
    /// Byte offset just past the span
    pub end: usize,
}

/// Finds the MD&A section in normalized text.
pub trait MdaLocator {
    /// Locate the first span at or after byte offset `start`.
    fn locate(&self, text: &str, start: usize) -> Option<MdaMatch>;
}

impl<F> MdaLocator for F
where
    F: Fn(&str, usize) -> Option<MdaMatch>,
{
    fn locate(&self, text: &str, start: usize) -> Option<MdaMatch> {
        self(text, start)
    }
}

/// Run the locator over `text`, searching again from the end of a first hit
/// that is too short to be the section itself.
pub fn extract_mda(text: &str, locator: &dyn MdaLocator) -> Option<String> {
    let first = locator.locate(text, 0)?;
    if first.text.is_empty() {
        return None;
    }
    if first.text.len() >= MIN_MDA_BYTES {
        return Some(first.text);
    }

    log::debug!(
        "MD&A candidate is {} bytes, searching again from offset {}",
        first.text.len(),
        first.end
    );
    locator
        .locate(text, first.end)
        .map(|m| m.text)
        .filter(|text| !text.is_empty())
}

/// Outcome of [`parse_mda`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdaOutcome {
    /// The section was written to this path
    Written(PathBuf),
    /// The destination already existed
    Skipped(PathBuf),
    /// The locator found nothing
    NotFound,
}

/// Read a flattened form, normalize it, extract the MD&A section and write it
/// to `mda_path`.
pub fn parse_mda<P, Q>(form_path: P, mda_path: Q, locator: &dyn MdaLocator, overwrite: bool) -> Result<MdaOutcome>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let form_path = form_path.as_ref();
    let mda_path = mda_path.as_ref();

    if !overwrite && mda_path.exists() {
        log::warn!("{} already exists. Skipping MD&A", mda_path.display());
        return Ok(MdaOutcome::Skipped(mda_path.to_path_buf()));
    }

    log::info!("Parsing MD&A from {}", form_path.display());
    let text = normalize_text(&fs::read_to_string(form_path)?);

    match extract_mda(&text, locator) {
        Some(mda) => {
            write_content(&mda, mda_path)?;
            Ok(MdaOutcome::Written(mda_path.to_path_buf()))
        }
        None => {
            log::warn!("MD&A not found in {}", form_path.display());
            Ok(MdaOutcome::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Returns each line starting with "Item 7." up to the next "Item 8."
    fn item_seven(text: &str, start: usize) -> Option<MdaMatch> {
        let begin = start + text[start..].find("Item 7.")?;
        let end = text[begin..]
            .find("Item 8.")
            .map(|offset| begin + offset)
            .unwrap_or(text.len());
        Some(MdaMatch {
            text: text[begin..end].to_string(),
            end,
        })
    }

    fn long_body() -> String {
        "Revenue increased. ".repeat(80)
    }

    #[test]
    fn test_long_first_match_kept() {
        let text = format!("Item 7. MD&A\n{}\nItem 8. Financials", long_body());
        let mda = extract_mda(&text, &item_seven).unwrap();
        assert!(mda.starts_with("Item 7. MD&A"));
        assert!(mda.len() >= MIN_MDA_BYTES);
    }

    #[test]
    fn test_short_first_match_retried() {
        let text = format!(
            "Index\nItem 7. MD&A 25\nItem 8. Financials 40\n\nItem 7. MD&A\n{}\nItem 8. Financials",
            long_body()
        );
        let mda = extract_mda(&text, &item_seven).unwrap();
        assert!(mda.contains("Revenue increased."));
        assert!(!mda.contains("25"));
    }

    #[test]
    fn test_short_match_without_second() {
        let text = "Item 7. MD&A 25\nItem 8. Financials";
        assert_eq!(extract_mda(text, &item_seven), None);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(extract_mda("nothing here", &item_seven), None);
    }

    #[test]
    fn test_parse_mda_writes_and_skips() {
        let dir = tempdir().unwrap();
        let form = dir.path().join("form.parsed.txt");
        let out = dir.path().join("form.mda.txt");
        fs::write(
            &form,
            format!("I tem 7.\n MD&A\n{}\nItem 8. Financials", long_body()),
        )
        .unwrap();

        let outcome = parse_mda(&form, &out, &item_seven, false).unwrap();
        assert_eq!(outcome, MdaOutcome::Written(out.clone()));
        let written = fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("Item 7. MD&A"));

        let again = parse_mda(&form, &out, &item_seven, false).unwrap();
        assert_eq!(again, MdaOutcome::Skipped(out));
    }

    #[test]
    fn test_parse_mda_not_found() {
        let dir = tempdir().unwrap();
        let form = dir.path().join("form.parsed.txt");
        fs::write(&form, "no section").unwrap();

        let outcome = parse_mda(&form, dir.path().join("mda.txt"), &item_seven, true).unwrap();
        assert_eq!(outcome, MdaOutcome::NotFound);
    }
}
