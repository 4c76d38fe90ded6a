//! Theorem-like claims: theorems, lemmas, corollaries and propositions.

use crate::cleanup::PageText;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Default statement length cap, in characters.
pub const DEFAULT_STATEMENT_CAP: usize = 400;

/// Claim header at the start of a line or right after a finished sentence.
static RE_CLAIM_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(?:^ ?|[.!?] +)(Theorem|Lemma|Corollary|Proposition) +(\d+(?:\.\d+)*)\.? *(?:\(([^()\n]*)\))?",
    )
    .unwrap()
});

static RE_PROOF_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^ ?Proof\b").unwrap());

/// Kind of claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClaimKind {
    Theorem,
    Lemma,
    Corollary,
    Proposition,
}

impl ClaimKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "Theorem" => Some(Self::Theorem),
            "Lemma" => Some(Self::Lemma),
            "Corollary" => Some(Self::Corollary),
            "Proposition" => Some(Self::Proposition),
            _ => None,
        }
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Self::Theorem => "Theorem",
            Self::Lemma => "Lemma",
            Self::Corollary => "Corollary",
            Self::Proposition => "Proposition",
        };
        f.write_str(keyword)
    }
}

/// A numbered claim and its statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim {
    pub kind: ClaimKind,
    /// Dotted number, e.g. `22.1`.
    pub number: String,
    /// Parenthetical name, e.g. `Master theorem`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Statement text with line breaks joined by spaces.
    pub statement: String,
    /// The statement was cut at the length cap.
    pub truncated: bool,
    /// Length in characters before truncation, present only when truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_chars: Option<usize>,
}

impl Claim {
    /// Short label such as `Lemma 22.1`.
    pub fn label(&self) -> String {
        format!("{} {}", self.kind, self.number)
    }
}

/// Extracts every claim on the page, in source order.
///
/// A statement ends at the first blank line, the next claim header (also one
/// that follows a sentence on the same line), a `Proof` paragraph or the end of
/// the page. Statements longer than `statement_cap`
/// characters are truncated and flagged; empty statements are dropped.
pub fn extract_claims(page: &PageText, statement_cap: usize) -> Vec<Claim> {
    let text = page.as_str();
    let headers: Vec<regex::Captures<'_>> = RE_CLAIM_HEADER.captures_iter(text).collect();
    let mut claims = Vec::with_capacity(headers.len());

    for (idx, caps) in headers.iter().enumerate() {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Some(kind) = ClaimKind::from_keyword(&caps[1]) else {
            continue;
        };

        let region_end = headers
            .get(idx + 1)
            .and_then(|next| next.get(1))
            .map_or(text.len(), |m| m.start());
        let region = bound_statement(&text[whole.end()..region_end]);

        let joined = join_lines(region);
        if joined.is_empty() {
            continue;
        }
        let (statement, truncated) = truncate_chars(&joined, statement_cap);
        let original_chars = truncated.then(|| joined.chars().count());

        claims.push(Claim {
            kind,
            number: caps[2].to_string(),
            name: caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .filter(|name| !name.is_empty()),
            statement,
            truncated,
            original_chars,
        });
    }

    claims
}

/// Cuts the region at the first blank line or `Proof` paragraph.
fn bound_statement(region: &str) -> &str {
    let mut end = region.find("\n\n").unwrap_or(region.len());
    if let Some(proof) = RE_PROOF_START.find(&region[..end]) {
        end = proof.start();
    }
    &region[..end]
}

fn join_lines(region: &str) -> String {
    region
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(text: &str, cap: usize) -> (String, bool) {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => (text[..idx].trim_end().to_string(), true),
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<Claim> {
        extract_claims(&PageText::new(text), DEFAULT_STATEMENT_CAP)
    }

    #[test]
    fn test_theorem_with_name() {
        let claims = extract(
            "Theorem 4.1 (Master theorem)\nLet a >= 1 and b > 1 be constants.\n\nProse follows.",
        );
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].kind, ClaimKind::Theorem);
        assert_eq!(claims[0].number, "4.1");
        assert_eq!(claims[0].name.as_deref(), Some("Master theorem"));
        assert_eq!(claims[0].statement, "Let a >= 1 and b > 1 be constants.");
        assert!(!claims[0].truncated);
    }

    #[test]
    fn test_statement_on_header_line() {
        let claims = extract("Corollary 3.2 Any comparison sort requires many comparisons.");
        assert_eq!(claims[0].kind, ClaimKind::Corollary);
        assert_eq!(
            claims[0].statement,
            "Any comparison sort requires many comparisons."
        );
        assert!(claims[0].name.is_none());
    }

    #[test]
    fn test_multi_line_statement_joined() {
        let claims = extract("Lemma 22.1\nLet G be a graph\nand let s be a vertex.");
        assert_eq!(claims[0].statement, "Let G be a graph and let s be a vertex.");
    }

    #[test]
    fn test_theorem_stops_at_following_lemma() {
        let text = "Theorem 22.5\nBFS discovers every vertex.\nLemma 22.6\nThe d values are correct.";
        let claims = extract(text);
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].statement, "BFS discovers every vertex.");
        assert!(!claims[0].statement.contains("Lemma"));
        assert_eq!(claims[1].label(), "Lemma 22.6");
        assert_eq!(claims[1].statement, "The d values are correct.");
    }

    #[test]
    fn test_claims_sharing_a_line() {
        let claims = extract(
            "Theorem 22.5 BFS discovers every vertex. Lemma 22.6 The d values are correct.",
        );
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].label(), "Theorem 22.5");
        assert_eq!(claims[0].statement, "BFS discovers every vertex.");
        assert_eq!(claims[1].label(), "Lemma 22.6");
        assert_eq!(claims[1].statement, "The d values are correct.");
    }

    #[test]
    fn test_reference_inside_statement_kept() {
        let claims = extract("Corollary 22.7 By Lemma 22.6, every path is shortest.");
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].statement, "By Lemma 22.6, every path is shortest.");
        assert_eq!(claims[0].original_chars, None);
    }

    #[test]
    fn test_proof_bounds_statement() {
        let claims = extract("Lemma 6.1\nThe height is lg n.\nProof We argue by induction.");
        assert_eq!(claims[0].statement, "The height is lg n.");
    }

    #[test]
    fn test_empty_statement_rejected() {
        assert!(extract("Theorem 3.1\n\nUnrelated paragraph.").is_empty());
        assert!(extract("Theorem 3.1").is_empty());
    }

    #[test]
    fn test_truncation_flagged() {
        let long = "x".repeat(500);
        let claims = extract_claims(&PageText::new(&format!("Proposition 1.1 {long}")), 100);
        assert_eq!(claims[0].statement.chars().count(), 100);
        assert!(claims[0].truncated);
        assert_eq!(claims[0].original_chars, Some(500));
    }

    #[test]
    fn test_truncation_char_boundary() {
        let claims = extract_claims(&PageText::new("Lemma 2.1 ΘΘΘΘΘ"), 3);
        assert_eq!(claims[0].statement, "ΘΘΘ");
        assert!(claims[0].truncated);
    }

    #[test]
    fn test_mid_sentence_mention_is_not_a_claim() {
        assert!(extract("By Theorem 3.1, the bound holds.").is_empty());
    }

    #[test]
    fn test_multi_level_number() {
        let claims = extract("Theorem 2.3.4. Every tree is bipartite.");
        assert_eq!(claims[0].number, "2.3.4");
        assert_eq!(claims[0].statement, "Every tree is bipartite.");
    }
}
