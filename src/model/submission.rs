//! Submission container types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::detect::{strip_bom, DOCUMENT_MARKER};

/// A raw SGML-wrapped multi-document submission.
///
/// The container is read once and never mutated; every accessor borrows from
/// the original text.
#[derive(Debug, Clone)]
pub struct Submission {
    raw: String,
}

impl Submission {
    /// Wrap raw submission text. A leading byte-order mark is dropped.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let raw = match raw.strip_prefix('\u{FEFF}') {
            Some(stripped) => stripped.to_string(),
            None => raw,
        };
        Self { raw }
    }

    /// The raw container text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Segments produced by splitting on the document boundary marker.
    ///
    /// Segment 0 is everything before the first `<DOCUMENT>` (the SEC header);
    /// segment `n` is the body of the `n`-th embedded document.
    pub fn segments(&self) -> std::str::Split<'_, &'static str> {
        self.raw.split(DOCUMENT_MARKER)
    }

    /// All embedded documents in declaration order.
    pub fn documents(&self) -> Vec<EmbeddedDocument<'_>> {
        self.segments()
            .enumerate()
            .skip(1)
            .map(|(index, body)| EmbeddedDocument::parse(index, body))
            .collect()
    }

    /// Number of embedded documents.
    pub fn document_count(&self) -> usize {
        self.segments().count().saturating_sub(1)
    }

    /// Parse the SEC header block into metadata.
    pub fn metadata(&self) -> Metadata {
        let header = self.segments().next().unwrap_or_default();
        Metadata::parse(strip_bom(header))
    }
}

/// One `<DOCUMENT>` block of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedDocument<'a> {
    /// Segment index (1-based, matches the split position)
    pub index: usize,
    /// Declared `<TYPE>`
    pub doc_type: Option<&'a str>,
    /// Declared `<SEQUENCE>`
    pub sequence: Option<&'a str>,
    /// Declared `<FILENAME>`
    pub filename: Option<&'a str>,
    /// Declared `<DESCRIPTION>`
    pub description: Option<&'a str>,
    /// Raw segment text, unchanged
    pub body: &'a str,
}

impl<'a> EmbeddedDocument<'a> {
    /// Parse the declaration lines at the top of a segment.
    ///
    /// Declarations stop at the `<TEXT>` line; nothing inside the payload is
    /// interpreted.
    pub fn parse(index: usize, body: &'a str) -> Self {
        let mut doc = Self {
            index,
            doc_type: None,
            sequence: None,
            filename: None,
            description: None,
            body,
        };

        for line in body.lines() {
            let line = line.trim_end_matches('\r');
            if line.starts_with("<TEXT>") {
                break;
            }
            if let Some(value) = line.strip_prefix("<TYPE>") {
                doc.doc_type = Some(value.trim());
            } else if let Some(value) = line.strip_prefix("<SEQUENCE>") {
                doc.sequence = Some(value.trim());
            } else if let Some(value) = line.strip_prefix("<FILENAME>") {
                doc.filename = Some(value.trim());
            } else if let Some(value) = line.strip_prefix("<DESCRIPTION>") {
                doc.description = Some(value.trim());
            }
        }

        doc
    }

    /// Whether the payload carries a uuencode envelope.
    pub fn is_uuencoded(&self) -> bool {
        self.body
            .lines()
            .any(|line| line.starts_with("begin ") && line.split_whitespace().count() >= 3)
    }
}

/// Values from the `<SEC-HEADER>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Accession number (e.g. "0001558370-23-003469")
    pub accession_number: Option<String>,

    /// Conformed submission type (e.g. "10-K")
    pub submission_type: Option<String>,

    /// Public document count
    pub document_count: Option<u32>,

    /// Conformed period of report
    pub period_of_report: Option<NaiveDate>,

    /// Filed-as-of date
    pub filed_date: Option<NaiveDate>,

    /// Company conformed name (first filer)
    pub company_name: Option<String>,

    /// Central index key (first filer)
    pub cik: Option<String>,
}

impl Metadata {
    /// Parse header lines. Both `KEY:\tvalue` and `<KEY-NAME>value` layouts
    /// are accepted; the first occurrence of each key wins.
    pub fn parse(header: &str) -> Self {
        let mut meta = Metadata::default();

        for line in header.lines() {
            let Some((key, value)) = split_header_line(line) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            match key.as_str() {
                "ACCESSION NUMBER" => set_once(&mut meta.accession_number, value),
                "CONFORMED SUBMISSION TYPE" => set_once(&mut meta.submission_type, value),
                "PUBLIC DOCUMENT COUNT" => {
                    if meta.document_count.is_none() {
                        meta.document_count = value.parse().ok();
                    }
                }
                "CONFORMED PERIOD OF REPORT" | "PERIOD" => {
                    if meta.period_of_report.is_none() {
                        meta.period_of_report = parse_header_date(value);
                    }
                }
                "FILED AS OF DATE" | "FILING DATE" => {
                    if meta.filed_date.is_none() {
                        meta.filed_date = parse_header_date(value);
                    }
                }
                "COMPANY CONFORMED NAME" | "CONFORMED NAME" => {
                    set_once(&mut meta.company_name, value)
                }
                "CENTRAL INDEX KEY" | "CIK" => set_once(&mut meta.cik, value),
                _ => {}
            }
        }

        meta
    }
}

fn split_header_line(line: &str) -> Option<(String, &str)> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix('<') {
        let (tag, value) = rest.split_once('>')?;
        if tag.starts_with('/') {
            return None;
        }
        return Some((tag.replace('-', " "), value.trim()));
    }
    let (key, value) = line.split_once(':')?;
    Some((key.trim().to_string(), value.trim()))
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

/// Parse a `YYYYMMDD` header date.
pub fn parse_header_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d").ok()
}
