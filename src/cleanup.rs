//! # Text Normalizer
//!
//! A 3-stage pipeline that turns raw extractor output for one page into a
//! [`PageText`].
//!
//! ## Pipeline Stages
//!
//! 1. **Stage 1: Character filtering** - line ending unification, control/format
//!    character removal, horizontal whitespace mapping, Unicode NFC composition
//! 2. **Stage 2: Line cleaning** - collapse space runs, drop trailing whitespace
//! 3. **Stage 3: Final normalization** - bound blank-line runs, trim the page
//!
//! The pipeline is a total function and idempotent: normalizing an already
//! normalized page returns it unchanged.

use regex::Regex;
use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// The normalized content of one page.
///
/// Contains no control characters other than `\n` and never more than one
/// consecutive blank line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PageText(String);

impl PageText {
    /// Normalizes raw page text.
    pub fn new(raw: &str) -> Self {
        normalize_page(raw)
    }

    /// Returns the text as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns at most the first `max_chars` characters of the page.
    pub fn head(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl Deref for PageText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PageText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Stage 1: Character filtering
// ============================================================================

/// Stage 1: Filter and map characters
///
/// - `\r\n` and lone `\r` become `\n`
/// - Form feeds and other control/format characters are dropped
/// - Tabs and exotic spaces become a plain space
/// - Unicode NFC composition (after filtering, so removal cannot expose new
///   composable pairs on a second run)
pub fn stage1_filter_chars(input: &str) -> String {
    let mut filtered = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            filtered.push('\n');
            continue;
        }

        if c == '\n' {
            filtered.push('\n');
            continue;
        }

        if is_horizontal_space(c) {
            filtered.push(' ');
            continue;
        }

        if is_removable_char(c) {
            continue;
        }

        filtered.push(c);
    }

    filtered.nfc().collect()
}

/// Check if character renders as horizontal whitespace
fn is_horizontal_space(c: char) -> bool {
    matches!(
        c,
        ' '
        | '\t'
        | '\u{00A0}'             // No-break space
        | '\u{2000}'..='\u{200A}' // En quad .. hair space
        | '\u{202F}'             // Narrow no-break space
        | '\u{205F}'             // Medium mathematical space
        | '\u{3000}' // Ideographic space
    )
}

/// Check if character is a control or invisible format character
fn is_removable_char(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{FEFF}'               // BOM
            | '\u{FFFD}'             // Replacement character
            | '\u{00AD}'             // Soft hyphen
            | '\u{200B}'..='\u{200D}' // Zero-width space / joiners
            | '\u{2060}' // Word joiner
        )
}

// ============================================================================
// Stage 2: Line cleaning
// ============================================================================

static RE_MULTIPLE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Stage 2: Line-based cleaning
///
/// - Collapse runs of spaces into one
/// - Remove trailing whitespace so whitespace-only lines become blank
pub fn stage2_clean_lines(input: &str) -> String {
    input
        .split('\n')
        .map(|line| RE_MULTIPLE_SPACES.replace_all(line, " ").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Stage 3: Final Normalization
// ============================================================================

static RE_MULTIPLE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Stage 3: Final normalization
///
/// - Reduce consecutive newlines (3+ -> 2)
/// - Trim leading and trailing whitespace of the page
pub fn stage3_final_normalize(input: &str) -> String {
    RE_MULTIPLE_NEWLINES
        .replace_all(input, "\n\n")
        .trim()
        .to_string()
}

// ============================================================================
// Main Pipeline
// ============================================================================

/// Run the full normalization pipeline on raw page text
///
/// # Example
///
/// ```
/// use folio::cleanup::normalize_page;
///
/// let page = normalize_page("\u{000C}22.2  Breadth-first\tsearch\n\n\n\nBFS(G, s)");
/// assert_eq!(page.as_str(), "22.2 Breadth-first search\n\nBFS(G, s)");
/// ```
pub fn normalize_page(input: &str) -> PageText {
    let result = stage1_filter_chars(input);
    let result = stage2_clean_lines(&result);
    PageText(stage3_final_normalize(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_feed_removal() {
        let page = normalize_page("\u{000C}Chapter 6\u{000C}");
        assert_eq!(page.as_str(), "Chapter 6");
    }

    #[test]
    fn test_horizontal_whitespace_collapse() {
        let page = normalize_page("for  each\t\tvertex   u");
        assert_eq!(page.as_str(), "for each vertex u");
    }

    #[test]
    fn test_newlines_preserved() {
        let page = normalize_page("1 x = 1\n2 y = 2");
        assert_eq!(page.lines().count(), 2);
    }

    #[test]
    fn test_blank_line_runs_bounded() {
        let page = normalize_page("first\n\n\n\n\nsecond\n \n\t\n \nthird");
        assert_eq!(page.as_str(), "first\n\nsecond\n\nthird");
        assert!(!page.contains("\n\n\n"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let page = normalize_page("a\r\nb\rc");
        assert_eq!(page.as_str(), "a\nb\nc");
    }

    #[test]
    fn test_control_and_format_chars() {
        let page = normalize_page("he\u{00AD}ap\u{0000}\u{FEFF}\u{000B}sort\u{200B}");
        assert_eq!(page.as_str(), "heapsort");
        assert!(!page.chars().any(|c| c.is_control() && c != '\n'));
    }

    #[test]
    fn test_exotic_spaces() {
        let page = normalize_page("n\u{00A0}lg\u{3000}n");
        assert_eq!(page.as_str(), "n lg n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_page("").as_str(), "");
        assert_eq!(normalize_page("\u{000C}\n\n \t").as_str(), "");
    }

    #[test]
    fn test_nfc_composition() {
        let page = normalize_page("Erdo\u{030B}s");
        assert_eq!(page.as_str(), "Erd\u{0151}s");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "\u{000C}  H EAP -E XTRACT-M AX .A/ \n1 if A:heap-size < 1\n\n\n\n2 error",
            "e\u{000C}\u{0301} mixed \r\n\r\n\r\n\r\n lines \t ",
            "",
            "   leading\n\n\n   trailing   ",
        ];
        for raw in samples {
            let once = normalize_page(raw);
            let twice = normalize_page(once.as_str());
            assert_eq!(once, twice, "second pass changed {:?}", raw);
        }
    }

    #[test]
    fn test_head_respects_char_boundaries() {
        let page = normalize_page("ΘΩO rest");
        assert_eq!(page.head(3), "ΘΩO");
        assert_eq!(page.head(100), "ΘΩO rest");
    }
}
