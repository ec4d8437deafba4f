//! HTML normalization ahead of flattening.
//!
//! Removes noise regions, turns bold tags into textual markers, and moves data
//! tables and images into side tables, leaving a placeholder marker where each
//! one stood.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{ImageEntry, NormalizedDocument, PlaceholderId, TableEntry};
use crate::render::normalize::fold_ascii;

use super::extractor::DocumentExtractor;
use super::options::{ErrorMode, ParseOptions};

/// Fold the extracted HTML to ASCII before normalization.
pub fn prepare_html(html: &str, fold: bool) -> String {
    if fold {
        fold_ascii(html)
    } else {
        html.to_string()
    }
}

/// Normalizer configured from [`ParseOptions`].
pub struct HtmlNormalizer<'a> {
    options: &'a ParseOptions,
    noise: Vec<Regex>,
    bold_open: Regex,
    bold_close: Regex,
    table: Regex,
    image: Regex,
    src: Regex,
}

impl<'a> HtmlNormalizer<'a> {
    /// Compile the normalizer. Fails only if a noise marker cannot form a
    /// valid pattern.
    pub fn new(options: &'a ParseOptions) -> Result<Self> {
        let noise = options
            .noise_regions
            .iter()
            .map(|region| {
                Regex::new(&format!(
                    "(?is){}.*?{}",
                    regex::escape(&region.start),
                    regex::escape(&region.end)
                ))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            options,
            noise,
            bold_open: Regex::new(r"(?i)<(?:strong|b)(?:\s[^>]*)?>").unwrap(),
            bold_close: Regex::new(r"(?i)</(?:strong|b)\s*>").unwrap(),
            table: Regex::new(r"(?is)<table\b.*?</table\s*>").unwrap(),
            image: Regex::new(r"(?is)<img\b.*?>").unwrap(),
            src: Regex::new(r#"(?is)\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap(),
        })
    }

    /// Normalize `html`, resolving images against the raw submission.
    pub fn normalize(&self, html: &str, raw: &str) -> Result<NormalizedDocument> {
        let mut doc = NormalizedDocument::default();

        let html = self.remove_noise(html);
        let html = self.mark_bold(&html);
        let html = self.extract_tables(&html, &mut doc);
        doc.html = self.extract_images(&html, raw, &mut doc)?;

        log::info!(
            "Normalized HTML: {}/{} tables kept, {} images resolved from {} tags",
            doc.tables.len(),
            doc.raw_table_count,
            doc.images.len(),
            doc.image_tag_count
        );
        Ok(doc)
    }

    fn remove_noise(&self, html: &str) -> String {
        let mut html = html.to_string();
        for pattern in &self.noise {
            html = pattern.replace_all(&html, "").into_owned();
        }
        html
    }

    fn mark_bold(&self, html: &str) -> String {
        let html = self.bold_open.replace_all(html, "** ");
        self.bold_close.replace_all(&html, " **").into_owned()
    }

    fn extract_tables(&self, html: &str, doc: &mut NormalizedDocument) -> String {
        let filter = &self.options.table_filter;
        let mut seen = 0;
        let mut kept = Vec::new();

        let html = self.table.replace_all(html, |caps: &regex::Captures| {
            let markup = &caps[0];
            let row_count = markup.to_ascii_lowercase().matches("</tr>").count();
            seen += 1;

            if !filter.keeps(markup, row_count) {
                log::debug!("Table {} left inline ({} rows)", seen, row_count);
                return markup.to_string();
            }

            let id = PlaceholderId::table(kept.len() + 1);
            log::debug!("Table {} extracted as {} ({} rows)", seen, id, row_count);
            let marker = id.html_marker();
            kept.push(TableEntry {
                id,
                markup: markup.to_string(),
                row_count,
            });
            marker
        });
        let html = html.into_owned();

        doc.raw_table_count = seen;
        doc.tables = kept;
        html
    }

    fn extract_images(&self, html: &str, raw: &str, doc: &mut NormalizedDocument) -> Result<String> {
        let extractor = DocumentExtractor::new(raw);
        let mut resolved = HashSet::new();
        let mut out = String::with_capacity(html.len());
        let mut last = 0;

        for tag in self.image.find_iter(html) {
            out.push_str(&html[last..tag.start()]);
            last = tag.end();
            doc.image_tag_count += 1;

            let src = self
                .src
                .captures(tag.as_str())
                .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
                .map(|m| m.as_str())
                .ok_or_else(|| Error::MissingAttribute(format!("src in {}", tag.as_str())))?;
            let id = PlaceholderId::image(src);

            if self.options.extract_images && resolved.insert(src.to_string()) {
                match extractor.binary_file(src) {
                    Ok(data) => doc.images.push(ImageEntry {
                        id: id.clone(),
                        src: src.to_string(),
                        data,
                    }),
                    Err(e) if e.is_not_found() => {
                        log::warn!("Image {} is not in the submission", src);
                    }
                    Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                        log::warn!("Skipping image {}: {}", src, e);
                    }
                    Err(e) => return Err(e),
                }
            }

            out.push_str(&id.html_marker());
        }
        out.push_str(&html[last..]);

        Ok(out)
    }
}

/// Normalize HTML with the given options.
pub fn normalize_html(html: &str, raw: &str, options: &ParseOptions) -> Result<NormalizedDocument> {
    HtmlNormalizer::new(options)?.normalize(html, raw)
}
