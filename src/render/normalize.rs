//! Text normalization for section search.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Glyphs mapped before ASCII folding, since NFKD has no ASCII form for them.
const PUNCTUATION_MAP: &[(char, &str)] = &[
    ('\u{25CF}', ">> "), // ●
    ('\u{2022}', ">> "), // •
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
];

/// Fold text to ASCII: map typographic punctuation, NFKD-decompose, then drop
/// every remaining non-ASCII code point.
pub fn fold_ascii(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    let mut mapped = String::with_capacity(text.len());
    for c in text.chars() {
        match PUNCTUATION_MAP.iter().find(|(glyph, _)| *glyph == c) {
            Some((_, replacement)) => mapped.push_str(replacement),
            None => mapped.push(c),
        }
    }

    mapped.nfkd().filter(char::is_ascii).collect()
}

/// Normalizer applied to flattened text before section search.
pub struct TextNormalizer {
    trailing_spaces: Regex,
    leading_spaces: Regex,
    newline_runs: Regex,
    keyword_fixes: Vec<(Regex, &'static str)>,
    letter_spaced: Regex,
    item_number: Regex,
}

impl TextNormalizer {
    /// Create a normalizer.
    pub fn new() -> Self {
        Self {
            trailing_spaces: Regex::new(r"[ ]+\n").unwrap(),
            leading_spaces: Regex::new(r"\n[ ]+").unwrap(),
            newline_runs: Regex::new(r"\n+").unwrap(),
            keyword_fixes: vec![
                (Regex::new(r"I\s?T\s?E\s?M").unwrap(), "ITEM"),
                (Regex::new(r"I\s?t\s?e\s?m").unwrap(), "Item"),
                (
                    Regex::new(r"M\s?A\s?N\s?A\s?G\s?E\s?M\s?E\s?N\s?T").unwrap(),
                    "MANAGEMENT",
                ),
                (
                    Regex::new(r"M\s?a\s?n\s?a\s?g\s?e\s?m\s?e\s?n\s?t").unwrap(),
                    "Management",
                ),
            ],
            letter_spaced: Regex::new(r"\b[A-Z](?: [A-Z]\b){3,}").unwrap(),
            item_number: Regex::new(r"(?i)(Item\s*\d\.)\s+").unwrap(),
        }
    }

    /// Normalize text.
    pub fn normalize(&self, text: &str) -> String {
        // Stage 1: Unicode and line breaks
        let text: String = text.nfkd().collect();
        let text = text.lines().collect::<Vec<_>>().join("\n");

        // Stage 2: whitespace around newlines
        let text = self.trailing_spaces.replace_all(&text, "\n");
        let text = self.leading_spaces.replace_all(&text, "\n");
        let text = self.newline_runs.replace_all(&text, "\n");
        let text = text.trim_start().replace("\n.\n", ".\n");

        // Stage 3: letter-spaced keywords
        let mut text = text;
        for (pattern, replacement) in &self.keyword_fixes {
            text = pattern.replace_all(&text, *replacement).into_owned();
        }
        let text = self
            .letter_spaced
            .replace_all(&text, |caps: &regex::Captures| caps[0].replace(' ', ""));
        let text = self.item_number.replace_all(&text, "${1} ");

        // Stage 4: punctuation joins
        text.replace(":\n", ".\n")
            .replace("$\n", "$")
            .replace("\n%", "%")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize text with a default [`TextNormalizer`].
pub fn normalize_text(text: &str) -> String {
    TextNormalizer::new().normalize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_ascii() {
        assert_eq!(fold_ascii("caf\u{e9}"), "cafe");
        assert_eq!(fold_ascii("\u{25CF}Risk"), ">> Risk");
        assert_eq!(fold_ascii("company\u{2019}s"), "company's");
        assert_eq!(fold_ascii("a\u{a0}b"), "a b");
        assert_eq!(fold_ascii("zero\u{200b}width"), "zerowidth");
        assert_eq!(fold_ascii("plain"), "plain");
    }

    #[test]
    fn test_letter_spacing_collapsed() {
        assert_eq!(normalize_text("I T E M 1. B U S I N E S S"), "ITEM 1. BUSINESS");
    }

    #[test]
    fn test_short_letter_lists_kept() {
        assert_eq!(normalize_text("Classes A B C shares"), "Classes A B C shares");
        assert_eq!(normalize_text("Series A B shares"), "Series A B shares");
    }

    #[test]
    fn test_keyword_spacing() {
        assert_eq!(normalize_text("I tem 7. M anagement"), "Item 7. Management");
    }

    #[test]
    fn test_whitespace_around_newlines() {
        let text = "  Intro   \n\n\n   Next line\n.\nEnd";
        assert_eq!(normalize_text(text), "Intro\nNext line.\nEnd");
    }

    #[test]
    fn test_item_number_spacing() {
        assert_eq!(
            normalize_text("Item 7.\nManagement's Discussion"),
            "Item 7. Management's Discussion"
        );
    }

    #[test]
    fn test_punctuation_joins() {
        assert_eq!(normalize_text("as follows:\nnext"), "as follows.\nnext");
        assert_eq!(normalize_text("$\n100\n% of"), "$100% of");
    }

    #[test]
    fn test_unicode_line_breaks_unified() {
        assert_eq!(normalize_text("one\r\ntwo"), "one\ntwo");
    }
}
