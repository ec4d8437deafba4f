//! Flattening of normalized HTML into a line stream.
//!
//! One depth-first walk over the parsed tree. Rules, in order of precedence:
//!
//! 1. `p`/`b`/`span` styled centered around a bare page number are blanked;
//!    those styled bold become a bold header built from their raw text.
//! 2. Inline elements (`span`, `em`, `sup`, `sub`, `i`, `a`, `td`, `ix:*`)
//!    collapse into their text with no separators.
//! 3. A `p` or `tr` whose children are all text or inline elements becomes a
//!    single line, classified by tag and `text-indent`.
//! 4. A `div`/`hr` with `page-break-after: always` becomes a page-break line
//!    carrying its own text.
//!
//! Everything else contributes its children in document order.

use scraper::{ElementRef, Html};

use crate::model::{bold_header, FlatLine, FlatStream, PlaceholderId};
use crate::render::normalize::fold_ascii;

use super::style::{Indent, StyleRules};

/// Outcome of rule 1 for a `p`/`b`/`span` element.
enum Restyle {
    Blank,
    Bold(String),
}

impl Restyle {
    fn into_text(self) -> String {
        match self {
            Restyle::Blank => String::new(),
            Restyle::Bold(text) => bold_header(&text),
        }
    }
}

/// Converts a parsed HTML tree into a [`FlatStream`].
#[derive(Debug, Clone)]
pub struct TextFlattener {
    rules: StyleRules,
    fold_ascii: bool,
}

impl TextFlattener {
    /// Create a flattener that folds text to ASCII.
    pub fn new() -> Self {
        Self {
            rules: StyleRules::new(),
            fold_ascii: true,
        }
    }

    /// Enable or disable ASCII folding of text nodes.
    pub fn with_ascii_folding(mut self, fold: bool) -> Self {
        self.fold_ascii = fold;
        self
    }

    /// Parse and flatten an HTML string.
    pub fn flatten_html(&self, html: &str) -> FlatStream {
        let document = Html::parse_document(html);
        self.flatten(&document)
    }

    /// Flatten a parsed document.
    pub fn flatten(&self, document: &Html) -> FlatStream {
        let mut out = FlatStream::new();
        self.walk_element(document.root_element(), &mut out, true);
        out
    }

    fn walk_element(&self, element: ElementRef, out: &mut FlatStream, page_breaks: bool) {
        let name = element.value().name();
        if is_skipped(name) {
            return;
        }

        let restyle = self.restyle(element);

        if is_inline(name) {
            out.push(self.inline_line(element, restyle));
            return;
        }

        if matches!(name, "p" | "tr") && (restyle.is_some() || self.is_leaf(element)) {
            out.push(self.leaf_line(element, restyle));
            return;
        }

        if let Some(restyle) = restyle {
            // A restyled `b` outside any paragraph
            out.push(match restyle {
                Restyle::Blank => FlatLine::Text(String::new()),
                Restyle::Bold(text) => FlatLine::BoldHeader(text),
            });
            return;
        }

        if page_breaks && matches!(name, "div" | "hr") && self.declares_page_break(element) {
            let mut inner = FlatStream::new();
            self.walk_children(element, &mut inner, false);
            out.push(FlatLine::PageBreak(inner.to_inline_text()));
            return;
        }

        self.walk_children(element, out, page_breaks);
    }

    fn walk_children(&self, element: ElementRef, out: &mut FlatStream, page_breaks: bool) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                out.push(FlatLine::Text(self.fold(text)));
            } else if let Some(child_element) = ElementRef::wrap(child) {
                self.walk_element(child_element, out, page_breaks);
            }
        }
    }

    /// Rule 1. Only `p`, `b` and `span` carrying a `style` attribute qualify.
    fn restyle(&self, element: ElementRef) -> Option<Restyle> {
        if !matches!(element.value().name(), "p" | "b" | "span") {
            return None;
        }
        let style = element.value().attr("style")?;

        let text = self.raw_text(element);
        if self.rules.is_centered(style) && self.rules.is_page_number(&text) {
            return Some(Restyle::Blank);
        }
        if self.rules.is_bold(style) {
            return Some(Restyle::Bold(text));
        }
        None
    }

    /// Rule 2 applied to a single inline element.
    fn inline_line(&self, element: ElementRef, restyle: Option<Restyle>) -> FlatLine {
        match restyle {
            Some(Restyle::Blank) => FlatLine::Text(String::new()),
            Some(Restyle::Bold(text)) => FlatLine::BoldHeader(text),
            None => {
                let text = self.inline_text(element);
                match PlaceholderId::parse_marker(&text) {
                    Some(id) => FlatLine::Placeholder(id),
                    None => FlatLine::Text(text),
                }
            }
        }
    }

    /// Text of an element with only rule 1 applied to it and its descendants.
    fn inline_text(&self, element: ElementRef) -> String {
        if is_skipped(element.value().name()) {
            return String::new();
        }
        if let Some(restyle) = self.restyle(element) {
            return restyle.into_text();
        }

        let mut text = String::new();
        for child in element.children() {
            if let Some(node) = child.value().as_text() {
                text.push_str(&self.fold(node));
            } else if let Some(child_element) = ElementRef::wrap(child) {
                text.push_str(&self.inline_text(child_element));
            }
        }
        text
    }

    fn is_leaf(&self, element: ElementRef) -> bool {
        element.children().all(|child| match ElementRef::wrap(child) {
            Some(child_element) => is_inline(child_element.value().name()),
            None => true,
        })
    }

    /// Rule 3.
    fn leaf_line(&self, element: ElementRef, restyle: Option<Restyle>) -> FlatLine {
        let name = element.value().name();

        let (text, bold) = match restyle {
            Some(Restyle::Bold(raw)) => (raw.replace('\n', ""), true),
            Some(Restyle::Blank) => (String::new(), false),
            None => (self.inline_children(element).replace('\n', ""), false),
        };

        if name == "tr" {
            return FlatLine::TableRow(text);
        }

        let indent = element
            .value()
            .attr("style")
            .map(|style| self.rules.indent(style))
            .unwrap_or(Indent::Absent);

        if bold && !matches!(indent, Indent::Unparsable) && !indent.is_positive() {
            return FlatLine::BoldHeader(text);
        }

        // The header's own leading newline is dropped with the others.
        let text = if bold {
            bold_header(&text).replace('\n', "")
        } else {
            text
        };

        match indent {
            Indent::Unparsable => FlatLine::Unformatted(text),
            indent if indent.is_positive() => FlatLine::Indented(text),
            _ => FlatLine::Paragraph(text),
        }
    }

    fn inline_children(&self, element: ElementRef) -> String {
        let mut text = String::new();
        for child in element.children() {
            if let Some(node) = child.value().as_text() {
                text.push_str(&self.fold(node));
            } else if let Some(child_element) = ElementRef::wrap(child) {
                text.push_str(&self.inline_text(child_element));
            }
        }
        text
    }

    fn declares_page_break(&self, element: ElementRef) -> bool {
        element
            .value()
            .attr("style")
            .is_some_and(|style| self.rules.is_page_break(style))
    }

    fn raw_text(&self, element: ElementRef) -> String {
        self.fold(&element.text().collect::<String>())
    }

    fn fold(&self, text: &str) -> String {
        if self.fold_ascii {
            fold_ascii(text)
        } else {
            text.to_string()
        }
    }
}

impl Default for TextFlattener {
    fn default() -> Self {
        Self::new()
    }
}

fn is_inline(name: &str) -> bool {
    matches!(name, "span" | "em" | "sup" | "sub" | "i" | "a" | "td") || name.starts_with("ix:")
}

fn is_skipped(name: &str) -> bool {
    matches!(name, "script" | "style")
}

/// Flatten an HTML string with default settings.
pub fn flatten_html(html: &str) -> FlatStream {
    TextFlattener::new().flatten_html(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineKind;

    #[test]
    fn test_bold_paragraph_then_body() {
        let stream =
            flatten_html("<p style='font-weight:bold'>Item 1.</p><p>Business overview text.</p>");
        let text = stream.to_text();

        let header = text.find("\n** Item 1. **").unwrap();
        let body = text.find("\nBusiness overview text.").unwrap();
        assert!(header < body);
        assert_eq!(stream.count(LineKind::BoldHeader), 1);
    }

    #[test]
    fn test_centered_page_number_blanked() {
        let stream = flatten_html("<p style=\"text-align:center\">12</p><p>Next</p>");
        assert_eq!(
            stream.lines(),
            &[
                FlatLine::Paragraph(String::new()),
                FlatLine::Paragraph("Next".into())
            ]
        );
    }

    #[test]
    fn test_centered_heading_not_blanked() {
        let stream = flatten_html("<p style=\"text-align:center\">PART I</p>");
        assert_eq!(stream.lines(), &[FlatLine::Paragraph("PART I".into())]);
    }

    #[test]
    fn test_indented_paragraph() {
        let stream = flatten_html("<p style=\"text-indent:18pt\">Indented</p>");
        assert_eq!(stream.to_text(), "\t\tIndented");
    }

    #[test]
    fn test_unparsable_indent_falls_back() {
        let stream = flatten_html("<p style=\"text-indent:.pt\">Loose</p>");
        assert_eq!(stream.lines(), &[FlatLine::Unformatted("Loose".into())]);
    }

    #[test]
    fn test_table_row_leaf() {
        let stream = flatten_html("<table><tr><td>Revenue</td><td>100</td></tr></table>");
        assert_eq!(stream.lines(), &[FlatLine::TableRow("Revenue100".into())]);
    }

    #[test]
    fn test_inline_elements_joined() {
        let stream = flatten_html("<p>Net <span>income</span> rose <em>sharply</em></p>");
        assert_eq!(
            stream.lines(),
            &[FlatLine::Paragraph("Net income rose sharply".into())]
        );
    }

    #[test]
    fn test_bold_span_inside_paragraph() {
        let stream =
            flatten_html("<p>Note <span style=\"font-weight:bold\">Risk</span></p>");
        assert_eq!(
            stream.lines(),
            &[FlatLine::Paragraph("Note ** Risk ** ".into())]
        );
    }

    #[test]
    fn test_ixbrl_inline_element() {
        let stream = flatten_html(
            "<p><ix:nonFraction name=\"us-gaap:Shares\">1,000</ix:nonFraction> shares</p>",
        );
        assert_eq!(stream.lines(), &[FlatLine::Paragraph("1,000 shares".into())]);
    }

    #[test]
    fn test_placeholder_recognized() {
        let stream =
            flatten_html("<div><i>\n--- TABLE_PLACEHOLDER: table_1 ---\n</i></div>");
        assert_eq!(
            stream.lines(),
            &[FlatLine::Placeholder(PlaceholderId::table(1))]
        );
        assert_eq!(stream.to_text(), "\n--- TABLE_PLACEHOLDER: table_1 ---\n");
    }

    #[test]
    fn test_page_break_carries_inner_text() {
        let stream = flatten_html(
            "<p>revenue</p><div style=\"page-break-after:always\"><p>3</p></div><p>grew</p>",
        );
        assert_eq!(stream.count(LineKind::PageBreak), 1);
        assert_eq!(
            stream.lines()[1],
            FlatLine::PageBreak("\n3".into())
        );
        assert!(stream.to_text().contains("--- PAGE BREAK ----\n3"));
    }

    #[test]
    fn test_nested_page_break_marked_once() {
        let stream = flatten_html(
            "<div style=\"page-break-after:always\"><div style=\"page-break-after:always\">x</div></div>",
        );
        assert_eq!(stream.to_text().matches("PAGE BREAK").count(), 1);
    }

    #[test]
    fn test_script_style_comment_skipped() {
        let stream = flatten_html(
            "<style>p{}</style><p>Visible<!-- hidden --></p><script>var x;</script>",
        );
        let text = stream.to_text();
        assert!(text.contains("Visible"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("p{}"));
    }

    #[test]
    fn test_entities_folded() {
        let stream = flatten_html("<p>caf&eacute; &#8220;quoted&#8221;</p>");
        assert_eq!(
            stream.lines(),
            &[FlatLine::Paragraph("cafe \"quoted\"".into())]
        );

        let raw = TextFlattener::new()
            .with_ascii_folding(false)
            .flatten_html("<p>caf&eacute;</p>");
        assert_eq!(raw.lines(), &[FlatLine::Paragraph("caf\u{e9}".into())]);
    }
}
