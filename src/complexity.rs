//! Asymptotic-notation tokens such as `O(n lg n)` or `Θ(n^2)`.
//!
//! Text extraction substitutes some bound symbols with look-alike glyphs; these
//! are mapped back to the canonical symbol before deduplication.

use crate::cleanup::PageText;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Default maximum argument length, in characters.
pub const DEFAULT_MAX_ARGUMENT_CHARS: usize = 40;

/// Glyph substitutions seen in extracted text, per canonical bound.
const BOUND_GLYPHS: &[(char, Bound)] = &[
    ('O', Bound::O),
    ('\u{041E}', Bound::O),     // Cyrillic capital O
    ('Θ', Bound::Theta),
    ('\u{201A}', Bound::Theta), // Single low-9 quotation mark, emitted for Θ
    ('\u{03F4}', Bound::Theta), // Greek capital theta symbol
    ('Ω', Bound::Omega),
    ('\u{2126}', Bound::Omega), // Ohm sign
];

/// Canonical bound family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    O,
    Theta,
    Omega,
}

impl Bound {
    /// Maps a glyph (canonical or look-alike) to its bound family.
    pub fn from_glyph(c: char) -> Option<Self> {
        BOUND_GLYPHS
            .iter()
            .find(|(glyph, _)| *glyph == c)
            .map(|(_, bound)| *bound)
    }

    /// Canonical symbol.
    pub fn symbol(self) -> char {
        match self {
            Bound::O => 'O',
            Bound::Theta => 'Θ',
            Bound::Omega => 'Ω',
        }
    }
}

/// A normalized asymptotic expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComplexityToken {
    pub bound: Bound,
    /// Argument with internal whitespace collapsed.
    pub argument: String,
}

impl fmt::Display for ComplexityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.bound.symbol(), self.argument)
    }
}

impl Serialize for ComplexityToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Extracts the distinct complexity tokens of a page in first-seen order.
///
/// A bound glyph counts only when it is not part of a word and is followed
/// (optionally after spaces) by a balanced, single-line parenthesized argument of
/// at most `max_argument_chars` characters.
pub fn extract_complexity(page: &PageText, max_argument_chars: usize) -> Vec<ComplexityToken> {
    let chars: Vec<(usize, char)> = page.char_indices().collect();
    let text = page.as_str();
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (_, c) = chars[i];
        let Some(bound) = Bound::from_glyph(c) else {
            i += 1;
            continue;
        };
        if i > 0 && chars[i - 1].1.is_alphanumeric() {
            i += 1;
            continue;
        }

        let Some((raw, next)) = scan_argument(text, &chars, i + 1) else {
            i += 1;
            continue;
        };
        let argument = collapse_whitespace(raw);
        if argument.is_empty() || argument.chars().count() > max_argument_chars {
            // Rescan inside the rejected span
            i += 1;
            continue;
        }

        let token = ComplexityToken { bound, argument };
        if seen.insert(token.to_string()) {
            tokens.push(token);
        }
        i = next;
    }

    tokens
}

/// Scans `( ... )` starting at `start`, skipping leading spaces.
///
/// Returns the raw argument and the index after the closing parenthesis, or
/// `None` if the parentheses are missing, unbalanced or span a line break.
fn scan_argument<'a>(text: &'a str, chars: &[(usize, char)], start: usize) -> Option<(&'a str, usize)> {
    let mut j = start;
    while j < chars.len() && chars[j].1 == ' ' {
        j += 1;
    }
    if chars.get(j)?.1 != '(' {
        return None;
    }

    let arg_start = chars.get(j + 1).map_or(text.len(), |(idx, _)| *idx);
    let mut depth = 1usize;

    for (k, &(idx, c)) in chars.iter().enumerate().skip(j + 1) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[arg_start..idx], k + 1));
                }
            }
            '\n' => return None,
            _ => {}
        }
    }

    None
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
