//! Inline `style` attribute inspection.

use regex::Regex;

/// Result of reading a `text-indent` declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Indent {
    /// No point-valued indent declared
    Absent,
    /// Indent in points
    Points(f64),
    /// A declaration whose value cannot be read as a number
    Unparsable,
}

impl Indent {
    /// Whether the indent is strictly positive.
    pub fn is_positive(self) -> bool {
        matches!(self, Indent::Points(pt) if pt > 0.0)
    }
}

/// Compiled matchers for the style cues the flattener reacts to.
#[derive(Debug, Clone)]
pub struct StyleRules {
    centered: Regex,
    bold: Regex,
    page_break: Regex,
    indent: Regex,
    page_number: Regex,
}

impl StyleRules {
    /// Compile the matchers.
    pub fn new() -> Self {
        Self {
            centered: Regex::new(r"(?i)text-align: ?center").unwrap(),
            bold: Regex::new(r"(?i)font-weight: ?(?:bold|bolder|[7-9]00)\b").unwrap(),
            page_break: Regex::new(r"(?i)page-breaks?-after:\s?always").unwrap(),
            indent: Regex::new(r"(?i)text-indent: ?([0-9.]*?)pt").unwrap(),
            page_number: Regex::new(r"^(?:[0-9]+|[ivxlc]+|[IVXLC]+)$").unwrap(),
        }
    }

    /// `text-align: center`.
    pub fn is_centered(&self, style: &str) -> bool {
        self.centered.is_match(style)
    }

    /// Bold font weight.
    pub fn is_bold(&self, style: &str) -> bool {
        self.bold.is_match(style)
    }

    /// `page-break-after: always`.
    pub fn is_page_break(&self, style: &str) -> bool {
        self.page_break.is_match(style)
    }

    /// Read the first point-valued `text-indent`.
    pub fn indent(&self, style: &str) -> Indent {
        let Some(caps) = self.indent.captures(style) else {
            return Indent::Absent;
        };
        match caps[1].parse::<f64>() {
            Ok(points) => Indent::Points(points),
            Err(_) => Indent::Unparsable,
        }
    }

    /// A bare page number: digits or a roman numeral, nothing else.
    pub fn is_page_number(&self, text: &str) -> bool {
        self.page_number.is_match(text.trim())
    }
}

impl Default for StyleRules {
    fn default() -> Self {
        Self::new()
    }
}
