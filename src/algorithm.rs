//! Algorithm block extraction.
//!
//! A block is a header line `NAME(params)` followed directly by numbered
//! pseudocode lines:
//!
//! ```text
//! H EAP -E XTRACT-M AX .A/
//! 1 if A:heap-size < 1
//! 2 error "heap underflow"
//! ```
//!
//! The extractor stylizes parentheses the way the source typesetting does: the
//! opening `(` may appear as `.` and the closing `)` as `/` or another
//! slash-like glyph. The name region is recovered with
//! [`normalize_identifier_with`].

use crate::cleanup::PageText;
use crate::identifier::{normalize_identifier_with, Identifier, IdentifierOptions};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Header start: name region and opening delimiter.
static RE_HEADER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ ?([A-Z][A-Z0-9 \-]*?) *[(.\x{FF08}]").unwrap());

/// Delimiters that nest inside a parameter list.
const NESTED_OPENERS: &[char] = &['(', '\u{FF08}'];

/// Closing delimiters, plain and stylized.
const CLOSERS: &[char] = &[')', '/', '\u{FF09}', '\u{2215}', '\u{2044}', '\u{2571}'];

/// Numbered pseudocode line: positive integer, whitespace, statement.
static RE_BODY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ ?(\d+) +(\S.*)$").unwrap());

/// One numbered pseudocode line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyLine {
    /// Line number as printed (positive, strictly increasing within a block).
    pub number: u32,
    /// Statement text.
    pub text: String,
}

/// A recovered pseudocode listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmBlock {
    /// Canonical procedure name.
    pub name: Identifier,
    /// Parameter list exactly as printed, without the delimiters.
    pub params: String,
    /// Numbered lines in source order.
    pub body: Vec<BodyLine>,
}

impl AlgorithmBlock {
    /// Returns the printed line numbers in order.
    pub fn line_numbers(&self) -> Vec<u32> {
        self.body.iter().map(|line| line.number).collect()
    }
}

impl fmt::Display for AlgorithmBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params)?;
        for line in &self.body {
            write!(f, "\n{:>2} {}", line.number, line.text)?;
        }
        Ok(())
    }
}

/// Header candidate parsed from a single line.
struct Header<'a> {
    name_region: &'a str,
    params: &'a str,
}

/// Parses `NAME(params)` where the parameter list is balanced and nothing but
/// spaces follows its closing delimiter.
fn parse_header(line: &str) -> Option<Header<'_>> {
    let caps = RE_HEADER_START.captures(line)?;
    let name_region = caps.get(1)?.as_str();
    let (params, rest) = split_params(&line[caps.get(0)?.end()..])?;
    if !rest.trim_end().is_empty() {
        return None;
    }
    Some(Header {
        name_region,
        params,
    })
}

/// Splits `text` at the delimiter closing an already-open parameter list.
fn split_params(text: &str) -> Option<(&str, &str)> {
    let mut depth = 1usize;
    for (idx, c) in text.char_indices() {
        if NESTED_OPENERS.contains(&c) {
            depth += 1;
        } else if CLOSERS.contains(&c) {
            depth -= 1;
            if depth == 0 {
                return Some((&text[..idx], &text[idx + c.len_utf8()..]));
            }
        }
    }
    None
}

fn parse_body_line(line: &str) -> Option<BodyLine> {
    let caps = RE_BODY_LINE.captures(line)?;
    let number: u32 = caps[1].parse().ok()?;
    let text = caps[2].trim();
    if number == 0 || text.is_empty() {
        return None;
    }
    Some(BodyLine {
        number,
        text: text.to_string(),
    })
}

/// Collects the numbered run starting at `lines[start]`.
///
/// The run ends at a blank line, a line of another shape, or a number that does
/// not increase.
fn collect_body(lines: &[&str], start: usize) -> Vec<BodyLine> {
    let mut body: Vec<BodyLine> = Vec::new();

    for line in &lines[start..] {
        let Some(parsed) = parse_body_line(line) else {
            break;
        };
        if body.last().is_some_and(|prev| parsed.number <= prev.number) {
            break;
        }
        body.push(parsed);
    }

    body
}

/// Extracts every algorithm block on the page, in source order.
///
/// Headers without at least one numbered line are rejected, as are name regions
/// that do not normalize to an identifier. Scanning resumes after the last body
/// line of each accepted block, so body lines are never reused.
pub fn extract_algorithms(page: &PageText, options: &IdentifierOptions) -> Vec<AlgorithmBlock> {
    let lines: Vec<&str> = page.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(header) = parse_header(lines[i]) else {
            i += 1;
            continue;
        };

        let body = collect_body(&lines, i + 1);
        if body.is_empty() {
            i += 1;
            continue;
        }

        let Some(name) = normalize_identifier_with(header.name_region, options) else {
            tracing::trace!(region = header.name_region, "rejected algorithm name region");
            i += 1;
            continue;
        };

        let consumed = body.len();
        blocks.push(AlgorithmBlock {
            name,
            params: header.params.trim().to_string(),
            body,
        });
        i += 1 + consumed;
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<AlgorithmBlock> {
        extract_algorithms(&PageText::new(text), &IdentifierOptions::default())
    }

    #[test]
    fn test_plain_header() {
        let blocks = extract("BFS(G, s)\n1 for each vertex u\n2 u.color = WHITE\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name.as_str(), "BFS");
        assert_eq!(blocks[0].params, "G, s");
        assert_eq!(blocks[0].line_numbers(), vec![1, 2]);
        assert_eq!(blocks[0].body[0].text, "for each vertex u");
    }

    #[test]
    fn test_small_caps_header_with_stylized_parens() {
        let text = "H EAP -E XTRACT-M AX .A/\n1 if A:heap-size < 1\n2 error \"heap underflow\"\n3 max = A[1]";
        let blocks = extract(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name.as_str(), "HEAP-EXTRACT-MAX");
        assert_eq!(blocks[0].params, "A");
        assert_eq!(blocks[0].body.len(), 3);
    }

    #[test]
    fn test_fullwidth_and_slash_like_closers() {
        for closer in ['\u{FF09}', '\u{2215}', '\u{2044}', '\u{2571}'] {
            let text = format!("Q UICKSORT(A, p, r{closer}\n1 if p < r");
            let blocks = extract(&text);
            assert_eq!(blocks.len(), 1, "closer {:?}", closer);
            assert_eq!(blocks[0].name.as_str(), "QUICKSORT");
            assert_eq!(blocks[0].params, "A, p, r");
        }
    }

    #[test]
    fn test_header_without_body_is_rejected() {
        assert!(extract("FIGURE(A)\nThe heap after extraction.").is_empty());
        assert!(extract("FIGURE(A)\n\n1 looks numbered but after a blank line").is_empty());
        assert!(extract("FIGURE(A)").is_empty());
    }

    #[test]
    fn test_single_line_body() {
        let blocks = extract("PARENT(i)\n1 return bi/2c");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body.len(), 1);
        assert_eq!(blocks[0].body[0].number, 1);
    }

    #[test]
    fn test_run_stops_at_prose() {
        let blocks = extract("LEFT(i)\n1 return 2i\nThe LEFT procedure can compute 2i in one instruction.\n2 stray");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body.len(), 1);
    }

    #[test]
    fn test_non_contiguous_numbers_allowed() {
        let blocks = extract("MERGE(A, p, q, r)\n1 n1 = q - p + 1\n2 n2 = r - q\n8 L[n1 + 1] = ∞");
        assert_eq!(blocks[0].line_numbers(), vec![1, 2, 8]);
    }

    #[test]
    fn test_decreasing_number_ends_run() {
        let blocks = extract("CUT-ROD(p, n)\n1 if n == 0\n2 return 0\n1 restart");
        assert_eq!(blocks[0].line_numbers(), vec![1, 2]);
    }

    #[test]
    fn test_zero_is_not_a_line_number() {
        assert!(extract("ROD(p)\n0 nothing").is_empty());
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let text = "PARENT(i)\n1 return bi/2c\nLEFT(i)\n1 return 2i\n\nRIGHT(i)\n1 return 2i + 1";
        let names: Vec<String> = extract(text)
            .iter()
            .map(|b| b.name.to_string())
            .collect();
        assert_eq!(names, vec!["PARENT", "LEFT", "RIGHT"]);
    }

    #[test]
    fn test_nested_parens_in_params() {
        let blocks = extract("FOO(BAR(x), y)\n1 return x");
        assert_eq!(blocks[0].name.as_str(), "FOO");
        assert_eq!(blocks[0].params, "BAR(x), y");
    }

    #[test]
    fn test_trailing_text_after_params_rejected() {
        assert!(extract("BFS(G, s) and DFS(G)\n1 for each vertex u").is_empty());
        assert!(extract("FOO(x) then\n1 return x").is_empty());
    }

    #[test]
    fn test_display_recurrence_rejected() {
        assert!(extract("T .n/ D 2T .n=2/ C \u{201A}.n/\n1 if n == 1\n2 return 1").is_empty());
    }

    #[test]
    fn test_unclosed_params_rejected() {
        assert!(extract("MERGE(A, p, q\n1 n1 = q - p + 1").is_empty());
    }

    #[test]
    fn test_trailing_spaces_after_closer_allowed() {
        let blocks = extract("INSERT .T; z/  \n1 y = NIL");
        assert_eq!(blocks[0].name.as_str(), "INSERT");
        assert_eq!(blocks[0].params, "T; z");
    }

    #[test]
    fn test_lowercase_header_ignored() {
        assert!(extract("Heapsort(A)\n1 build").is_empty());
    }

    #[test]
    fn test_display_listing() {
        let blocks = extract("BFS(G, s)\n1 for each vertex u\n2 ...");
        assert_eq!(blocks[0].to_string(), "BFS(G, s)\n 1 for each vertex u\n 2 ...");
    }
}
