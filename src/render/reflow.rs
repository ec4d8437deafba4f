//! Reflow of flattened text.
//!
//! Flattening leaves page-break markers, empty bold pairs, doubled spaces and
//! hard line breaks inside sentences. The stages below repair them in a fixed
//! order; each one reads the output of the previous stage.

use regex::Regex;

use crate::model::PAGE_BREAK_MARKER;

/// A named reflow stage, listed in execution order by [`ReflowStage::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReflowStage {
    /// Join sentences split by a page break, then turn markers into newlines
    PageBreaks,
    /// Collapse runs of asterisks and empty bold pairs
    BoldMarkers,
    /// Single spaces, and spaces around parentheses
    Spacing,
    /// Merge lines continuing a sentence, tidy blank lines
    LineJoins,
    /// Drop blank lines between plain paragraph lines
    BlankLines,
    /// Open space before item and part headings
    SectionHeaders,
}

impl ReflowStage {
    /// Every stage in execution order.
    pub const ALL: [ReflowStage; 6] = [
        ReflowStage::PageBreaks,
        ReflowStage::BoldMarkers,
        ReflowStage::Spacing,
        ReflowStage::LineJoins,
        ReflowStage::BlankLines,
        ReflowStage::SectionHeaders,
    ];

    /// Stage name as used in logs.
    pub fn name(self) -> &'static str {
        match self {
            ReflowStage::PageBreaks => "page_breaks",
            ReflowStage::BoldMarkers => "bold_markers",
            ReflowStage::Spacing => "spacing",
            ReflowStage::LineJoins => "line_joins",
            ReflowStage::BlankLines => "blank_lines",
            ReflowStage::SectionHeaders => "section_headers",
        }
    }
}

impl std::fmt::Display for ReflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for reflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflowOptions {
    /// Run the page-break stage
    pub page_breaks: bool,

    /// Run the bold-marker stage
    pub bold_markers: bool,

    /// Run the spacing stage
    pub spacing: bool,

    /// Run the line-join stage
    pub line_joins: bool,

    /// Run blank-line pruning
    pub blank_lines: bool,

    /// Run the section-header stage
    pub section_headers: bool,

    /// Lines before this index are never pruned
    pub blank_line_guard: usize,
}

impl ReflowOptions {
    /// All stages enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable one stage.
    pub fn with_stage(mut self, stage: ReflowStage, enabled: bool) -> Self {
        match stage {
            ReflowStage::PageBreaks => self.page_breaks = enabled,
            ReflowStage::BoldMarkers => self.bold_markers = enabled,
            ReflowStage::Spacing => self.spacing = enabled,
            ReflowStage::LineJoins => self.line_joins = enabled,
            ReflowStage::BlankLines => self.blank_lines = enabled,
            ReflowStage::SectionHeaders => self.section_headers = enabled,
        }
        self
    }

    /// Set how many leading lines are exempt from pruning.
    pub fn with_blank_line_guard(mut self, lines: usize) -> Self {
        self.blank_line_guard = lines;
        self
    }

    /// Whether a stage runs.
    pub fn is_enabled(&self, stage: ReflowStage) -> bool {
        match stage {
            ReflowStage::PageBreaks => self.page_breaks,
            ReflowStage::BoldMarkers => self.bold_markers,
            ReflowStage::Spacing => self.spacing,
            ReflowStage::LineJoins => self.line_joins,
            ReflowStage::BlankLines => self.blank_lines,
            ReflowStage::SectionHeaders => self.section_headers,
        }
    }
}

impl Default for ReflowOptions {
    fn default() -> Self {
        Self {
            page_breaks: true,
            bold_markers: true,
            spacing: true,
            line_joins: true,
            blank_lines: true,
            section_headers: true,
            blank_line_guard: 20,
        }
    }
}

/// Reflow pipeline.
pub struct ReflowPipeline {
    options: ReflowOptions,
    page_break_join: Regex,
    bold_line_start: Regex,
    bold_line_end: Regex,
    bold_inline: Regex,
    asterisk_lines: Regex,
    multi_space: Regex,
    paren_after: Regex,
    paren_before: Regex,
    blank_between: Regex,
    lowercase_join: Regex,
    tab_pull: Regex,
    section_header: Regex,
    all_caps: Regex,
    heading_start: Regex,
}

impl ReflowPipeline {
    /// Create a pipeline with the given options.
    pub fn new(options: ReflowOptions) -> Self {
        Self {
            options,
            page_break_join: Regex::new(&format!(
                r"\s+({})\s+([a-z])",
                regex::escape(PAGE_BREAK_MARKER)
            ))
            .unwrap(),
            bold_line_start: Regex::new(r"(?m)^(\*{4,}|\*\* *\*\*)").unwrap(),
            bold_line_end: Regex::new(r"(?m)(\*{4,}|\*\* *\*\*)\s+$").unwrap(),
            bold_inline: Regex::new(r"(\*{4,}|\s?\*\* *\*\*)\s?").unwrap(),
            asterisk_lines: Regex::new(r"(?m)^(\*|\s)+$").unwrap(),
            multi_space: Regex::new(r" {2,}").unwrap(),
            paren_after: Regex::new(r"\)(\w)").unwrap(),
            paren_before: Regex::new(r"(\w)\(").unwrap(),
            blank_between: Regex::new(r"\n\s+\n").unwrap(),
            lowercase_join: Regex::new(r"\n([a-z]+)").unwrap(),
            tab_pull: Regex::new(r"\n\n(\t\t[A-Z]+)").unwrap(),
            section_header: Regex::new(r"\n+([ *]*(?:Item|Part|ITEM|PART)\b)").unwrap(),
            all_caps: Regex::new(r"^[A-Z]+$").unwrap(),
            heading_start: Regex::new(r"^(?:[A-Z]{2,}\b|Item)").unwrap(),
        }
    }

    /// Run every enabled stage in order.
    pub fn process(&self, text: &str) -> String {
        let mut result = text.to_string();
        for stage in ReflowStage::ALL {
            if self.options.is_enabled(stage) {
                result = self.apply(stage, &result);
                log::debug!("Reflow {}: {} bytes", stage, result.len());
            }
        }
        result
    }

    /// Run a single stage regardless of the options.
    pub fn apply(&self, stage: ReflowStage, text: &str) -> String {
        match stage {
            ReflowStage::PageBreaks => self.page_breaks(text),
            ReflowStage::BoldMarkers => self.bold_markers(text),
            ReflowStage::Spacing => self.spacing(text),
            ReflowStage::LineJoins => self.line_joins(text),
            ReflowStage::BlankLines => self.blank_lines(text),
            ReflowStage::SectionHeaders => self.section_headers(text),
        }
    }

    fn page_breaks(&self, text: &str) -> String {
        let text = self.page_break_join.replace_all(text, " ${2}");
        text.replace(PAGE_BREAK_MARKER, "\n")
    }

    fn bold_markers(&self, text: &str) -> String {
        // Every rewrite shortens the text, so the loop terminates at a fixpoint.
        let mut current = text.to_string();
        loop {
            let next = self.collapse_bold_once(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    fn collapse_bold_once(&self, text: &str) -> String {
        let text = self.bold_line_start.replace_all(text, "**");
        let text = self.bold_line_end.replace_all(&text, "**");
        let text = self.bold_inline.replace_all(&text, "");
        self.asterisk_lines.replace_all(&text, "").into_owned()
    }

    fn spacing(&self, text: &str) -> String {
        let text = self.multi_space.replace_all(text, " ");
        let text = self.paren_after.replace_all(&text, ") ${1}");
        self.paren_before.replace_all(&text, "${1} (").into_owned()
    }

    fn line_joins(&self, text: &str) -> String {
        let text = self.blank_between.replace_all(text, "\n\n");
        let text = self.lowercase_join.replace_all(&text, " ${1}");
        self.tab_pull.replace_all(&text, "\n${1}").into_owned()
    }

    fn blank_lines(&self, text: &str) -> String {
        let lines: Vec<&str> = text.split('\n').collect();
        let guard = self.options.blank_line_guard;
        let last = lines.len().saturating_sub(1);

        let mut kept = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            if idx < guard || idx >= last || !line.trim().is_empty() {
                kept.push(*line);
                continue;
            }

            let previous = lines[..idx].iter().rev().find(|l| !l.trim().is_empty());
            let following = lines[idx + 1..].iter().find(|l| !l.trim().is_empty());
            let prunable = match (previous, following) {
                (Some(p), Some(f)) => self.is_plain_paragraph(p) && self.is_plain_paragraph(f),
                _ => false,
            };
            if !prunable {
                kept.push(*line);
            }
        }

        kept.join("\n")
    }

    fn section_headers(&self, text: &str) -> String {
        self.section_header
            .replace_all(text, "\n\n\n\n${1}")
            .into_owned()
    }

    /// Whether a line reads as running paragraph text rather than a heading,
    /// bold line or marker.
    pub fn is_plain_paragraph(&self, line: &str) -> bool {
        if line.contains("**") || line.contains("---") {
            return false;
        }
        if self.all_caps.is_match(line) || self.heading_start.is_match(line) {
            return false;
        }
        let trimmed = line.trim();
        !(is_titlecase(trimmed) || is_uppercase(trimmed))
    }
}

impl Default for ReflowPipeline {
    fn default() -> Self {
        Self::new(ReflowOptions::default())
    }
}

/// Reflow text with every stage enabled.
pub fn reflow(text: &str) -> String {
    ReflowPipeline::default().process(text)
}

/// Titlecase: at least one cased character, uppercase only at the start of a
/// word and lowercase only after a cased character.
fn is_titlecase(text: &str) -> bool {
    let mut cased = false;
    let mut previous_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else {
            previous_cased = false;
        }
    }
    cased
}

/// At least one cased character and no lowercase ones.
fn is_uppercase(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_break_continuation_merged() {
        let pipeline = ReflowPipeline::default();
        let text = "sales of the\n--- PAGE BREAK ----\n continued product line";
        assert_eq!(
            pipeline.apply(ReflowStage::PageBreaks, text),
            "sales of the continued product line"
        );
    }

    #[test]
    fn test_page_break_becomes_newline() {
        let pipeline = ReflowPipeline::default();
        let text = "end of page.\n--- PAGE BREAK ----\nPART II";
        assert_eq!(
            pipeline.apply(ReflowStage::PageBreaks, text),
            "end of page.\n\n\nPART II"
        );
    }

    #[test]
    fn test_bold_runs_collapsed() {
        let pipeline = ReflowPipeline::default();
        assert_eq!(pipeline.apply(ReflowStage::BoldMarkers, "****Heading"), "**Heading");
        assert_eq!(pipeline.apply(ReflowStage::BoldMarkers, "text\n** **\nmore"), "text\n\nmore");
        assert_eq!(
            pipeline.apply(ReflowStage::BoldMarkers, "\n** Item 1. ** \nbody"),
            "\n** Item 1. ** \nbody"
        );
    }

    #[test]
    fn test_bold_collapse_idempotent() {
        let pipeline = ReflowPipeline::default();
        let fragments = [
            "", "*", "**", "***", "** **", "****", " ", "\n", "\t\t", "Item 1.", "text",
            "** Risk ** ", "a ** ** b", "*** ***",
        ];

        for a in fragments {
            for b in fragments {
                for c in fragments {
                    let input = format!("{}{}{}", a, b, c);
                    let once = pipeline.apply(ReflowStage::BoldMarkers, &input);
                    let twice = pipeline.apply(ReflowStage::BoldMarkers, &once);
                    assert_eq!(once, twice, "not idempotent for {:?}", input);
                }
            }
        }
    }

    #[test]
    fn test_spacing() {
        let pipeline = ReflowPipeline::default();
        assert_eq!(
            pipeline.apply(ReflowStage::Spacing, "Net  income(loss)was   flat"),
            "Net income (loss) was flat"
        );
    }

    #[test]
    fn test_line_joins() {
        let pipeline = ReflowPipeline::default();
        assert_eq!(
            pipeline.apply(ReflowStage::LineJoins, "Revenue\nincreased"),
            "Revenue increased"
        );
        assert_eq!(pipeline.apply(ReflowStage::LineJoins, "A.\n  \nB."), "A.\n\nB.");
        assert_eq!(
            pipeline.apply(ReflowStage::LineJoins, "Totals\n\n\t\tREVENUE 10"),
            "Totals\n\t\tREVENUE 10"
        );
    }

    fn padded(lines: &[&str]) -> Vec<String> {
        let mut all: Vec<String> = (0..20).map(|i| format!("filler {}", i)).collect();
        all.extend(lines.iter().map(|l| l.to_string()));
        all
    }

    #[test]
    fn test_blank_line_pruning() {
        let pipeline = ReflowPipeline::default();
        let lines = padded(&[
            "plain sentence one.",
            "",
            "plain sentence two.",
            "",
            "** Header **",
            "",
            "another plain line.",
            "",
            "--- TABLE_PLACEHOLDER: table_1 ---",
            "",
            "closing plain line.",
            "",
            "Results Of Operations",
            "last",
        ]);
        let result = pipeline.apply(ReflowStage::BlankLines, &lines.join("\n"));
        let result: Vec<&str> = result.split('\n').collect();

        let mut expected: Vec<&str> = lines.iter().map(String::as_str).collect();
        expected.remove(21);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_blank_line_pruning_respects_guard() {
        let pipeline = ReflowPipeline::default();
        let text = "one.\n\ntwo.\nthree.";
        assert_eq!(pipeline.apply(ReflowStage::BlankLines, text), text);

        let eager = ReflowPipeline::new(ReflowOptions::default().with_blank_line_guard(0));
        assert_eq!(eager.apply(ReflowStage::BlankLines, text), "one.\ntwo.\nthree.");
    }

    #[test]
    fn test_pruning_keeps_blank_next_to_markers() {
        let pipeline = ReflowPipeline::new(ReflowOptions::default().with_blank_line_guard(0));
        let specials = ["** Risk Factors **", "--- IMAGE_PLACEHOLDER: image_a.jpg ---"];

        for special in specials {
            for text in [
                format!("a.\n{}\n\nb.\nc.", special),
                format!("a.\nb.\n\n{}\nc.", special),
                format!("a.\n{}\n\n\nb.\nc.", special),
            ] {
                let result = pipeline.apply(ReflowStage::BlankLines, &text);
                assert_eq!(result, text, "blank line next to {:?} removed", special);
            }
        }
    }

    #[test]
    fn test_section_headers() {
        let pipeline = ReflowPipeline::default();
        assert_eq!(
            pipeline.apply(ReflowStage::SectionHeaders, "intro\nItem 7. Management"),
            "intro\n\n\n\nItem 7. Management"
        );
        assert_eq!(
            pipeline.apply(ReflowStage::SectionHeaders, "intro\n\n** PART II"),
            "intro\n\n\n\n** PART II"
        );
        assert_eq!(
            pipeline.apply(ReflowStage::SectionHeaders, "intro\nItems listed"),
            "intro\nItems listed"
        );
    }

    #[test]
    fn test_is_plain_paragraph() {
        let pipeline = ReflowPipeline::default();
        assert!(pipeline.is_plain_paragraph("The company reported higher sales."));
        assert!(pipeline.is_plain_paragraph(""));
        assert!(!pipeline.is_plain_paragraph("ITEM"));
        assert!(!pipeline.is_plain_paragraph("RISK factors follow"));
        assert!(!pipeline.is_plain_paragraph("Item 1A. Risk Factors"));
        assert!(!pipeline.is_plain_paragraph("Results Of Operations"));
        assert!(!pipeline.is_plain_paragraph("NET SALES: 2023"));
        assert!(!pipeline.is_plain_paragraph("see ** note"));
    }

    #[test]
    fn test_disabled_stage_skipped() {
        let options = ReflowOptions::default().with_stage(ReflowStage::SectionHeaders, false);
        let pipeline = ReflowPipeline::new(options);
        assert_eq!(pipeline.process("intro\nItem 7."), "intro\nItem 7.");
    }

    #[test]
    fn test_bold_header_reflow() {
        let text = "\n** Item 1. ** \n\nBusiness overview text.";
        let result = reflow(text);
        assert!(result.contains("\n\n\n\n** Item 1. **"));
        assert!(result.ends_with("Business overview text."));
    }
}
