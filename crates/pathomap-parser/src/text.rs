//! Text cleanup shared by the pathogen and therapy parsers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Compile a pattern baked into the binary.
///
/// Every caller passes a string literal, so a failure here is a programming
/// error caught by the first test that touches the pattern.
pub(crate) fn pattern(source: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|e| panic!("invalid built-in pattern {source:?}: {e}"))
}

static CITATION: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\[\s*cite[^\]]*\]|\(\s*cite[^)]*\)"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| pattern(r"\s+"));

/// Remove `[cite…]` and `(cite…)` markers.
pub(crate) fn strip_citations(text: &str) -> String {
    CITATION.replace_all(text, " ").into_owned()
}

/// Collapse whitespace and trim list punctuation from both ends.
pub(crate) fn tidy(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    collapsed
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, ',' | ';' | ':' | '.' | '-' | '–' | '/' | '*' | '•' | '·')
        })
        .to_string()
}

/// Uppercase the first character, leave the rest as written.
pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_both_citation_shapes() {
        let cleaned = tidy(&strip_citations("E coli [cite: 12, 14] (cite 3)"));
        assert_eq!(cleaned, "E coli");
    }

    #[test]
    fn tidy_trims_bullets_and_separators() {
        assert_eq!(tidy("  • Klebsiella   pneumoniae ;"), "Klebsiella pneumoniae");
        assert_eq!(tidy("/- Metronidazole"), "Metronidazole");
    }

    #[test]
    fn capitalize_keeps_tail() {
        assert_eq!(capitalize_first("penicillin G"), "Penicillin G");
        assert_eq!(capitalize_first(""), "");
    }
}
