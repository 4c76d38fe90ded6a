//! Small-caps identifier recovery.
//!
//! Bold small-caps algorithm names lose their letter spacing during text
//! extraction: every capital that starts a small-caps run is followed by a stray
//! space, so `HEAP-EXTRACT-MAX` comes out as `H EAP -E XTRACT-M AX`.
//!
//! # Corruption grammar
//!
//! ```text
//! corrupted  := segment ( hyphen segment )*
//! segment    := glyph ( gap? glyph )*
//! gap        := " "+
//! hyphen     := " "* "-" " "*
//! glyph      := [A-Z0-9]
//! ```
//!
//! Recovery is a pure rewrite: delete every `gap` between two glyphs, then tighten
//! every `hyphen` to a bare `-`. The result is checked against the canonical form
//! (glyph runs joined by single hyphens) and rejected otherwise. Nothing is checked
//! against a vocabulary, so previously unseen names are recovered just as well.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static RE_GLYPH_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z0-9]) +([A-Z0-9])").unwrap());

static RE_HYPHEN_SPACING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *- *").unwrap());

static RE_HYPHEN_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

static RE_CANONICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]+(?:-[A-Z0-9]+)*$").unwrap());

/// A canonical algorithm name: uppercase letters and digits joined by single
/// hyphens, e.g. `HEAP-EXTRACT-MAX`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Accepts `text` only if it is already canonical.
    pub fn parse(text: &str) -> Option<Self> {
        is_canonical(text).then(|| Self(text.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the hyphen-separated words of the identifier.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split('-')
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_canonical(&value) {
            Ok(Self(value))
        } else {
            Err(format!("not a canonical identifier: {value:?}"))
        }
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// Options for identifier recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentifierOptions {
    /// Maximum number of gap-collapse passes.
    ///
    /// `None` iterates until no gap remains. `Some(2)` reproduces the empirical
    /// two-pass fit, which is enough when every letter boundary carries at most
    /// one corrupted space.
    pub max_passes: Option<usize>,
}

impl IdentifierOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the gap-collapse to `passes` passes (at least one).
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = Some(passes.max(1));
        self
    }
}

/// Returns true if `text` already satisfies the identifier invariant.
pub fn is_canonical(text: &str) -> bool {
    RE_CANONICAL.is_match(text)
}

/// Recovers a canonical identifier with default options.
///
/// # Example
///
/// ```
/// use folio::identifier::normalize_identifier;
///
/// let id = normalize_identifier("H EAP -E XTRACT-M AX").unwrap();
/// assert_eq!(id.as_str(), "HEAP-EXTRACT-MAX");
/// ```
pub fn normalize_identifier(raw: &str) -> Option<Identifier> {
    normalize_identifier_with(raw, &IdentifierOptions::default())
}

/// Recovers a canonical identifier from a possibly corrupted name region.
///
/// Returns `None` when the rewritten text is not canonical (lowercase letters,
/// punctuation, a gap left over by a pass limit, or nothing at all).
pub fn normalize_identifier_with(raw: &str, options: &IdentifierOptions) -> Option<Identifier> {
    let collapsed = collapse_gaps(raw.trim(), options.max_passes);
    let tightened = RE_HYPHEN_SPACING.replace_all(&collapsed, "-");
    let tightened = RE_HYPHEN_RUN.replace_all(&tightened, "-");
    let candidate = tightened.trim_matches('-');

    Identifier::parse(candidate)
}

/// Deletes the spaces between adjacent glyphs, pass by pass.
///
/// A single regex pass cannot rewrite overlapping gaps (`H E A P` becomes
/// `HE AP`), so passes repeat until nothing changes or the limit is reached.
fn collapse_gaps(input: &str, max_passes: Option<usize>) -> String {
    let mut current = input.to_string();
    let mut passes = 0;

    loop {
        if max_passes.is_some_and(|limit| passes >= limit) {
            break;
        }

        let next = RE_GLYPH_GAP.replace_all(&current, "$1$2");
        if next == current {
            break;
        }
        current = next.into_owned();
        passes += 1;
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_caps_recovery() {
        let cases = [
            ("H EAP -E XTRACT-M AX", "HEAP-EXTRACT-MAX"),
            ("Q UICKSORT", "QUICKSORT"),
            ("M AX -H EAPIFY", "MAX-HEAPIFY"),
            ("B UILD -M AX -H EAP", "BUILD-MAX-HEAP"),
            ("RB-I NSERT -F IXUP", "RB-INSERT-FIXUP"),
            ("BFS", "BFS"),
            ("VEB-T REE -M EMBER", "VEB-TREE-MEMBER"),
        ];
        for (raw, expected) in cases {
            let id = normalize_identifier(raw).unwrap();
            assert_eq!(id.as_str(), expected, "input {:?}", raw);
        }
    }

    #[test]
    fn test_fully_spaced_letters() {
        // Every boundary corrupted: a single pass only gets halfway
        let id = normalize_identifier("H E A P S O R T").unwrap();
        assert_eq!(id.as_str(), "HEAPSORT");
    }

    #[test]
    fn test_pass_limit() {
        let two = IdentifierOptions::new().with_max_passes(2);
        assert_eq!(
            normalize_identifier_with("H EAP -E XTRACT-M AX", &two)
                .unwrap()
                .as_str(),
            "HEAP-EXTRACT-MAX"
        );

        // One pass leaves "HE AP", which is not canonical
        let one = IdentifierOptions::new().with_max_passes(1);
        assert!(normalize_identifier_with("H E A P", &one).is_none());
    }

    #[test]
    fn test_zero_passes_clamped() {
        let options = IdentifierOptions::new().with_max_passes(0);
        assert_eq!(options.max_passes, Some(1));
    }

    #[test]
    fn test_idempotent_on_canonical() {
        for canonical in ["HEAP-EXTRACT-MAX", "QUICKSORT", "OS-RANK", "FIB-HEAP-INSERT"] {
            let id = normalize_identifier(canonical).unwrap();
            assert_eq!(id.as_str(), canonical);
            let again = normalize_identifier(id.as_str()).unwrap();
            assert_eq!(again, id);
        }
    }

    #[test]
    fn test_hyphen_cleanup() {
        assert_eq!(
            normalize_identifier("-LIST - -INSERT-").unwrap().as_str(),
            "LIST-INSERT"
        );
    }

    #[test]
    fn test_rejects_non_identifiers() {
        assert!(normalize_identifier("").is_none());
        assert!(normalize_identifier("  -  ").is_none());
        assert!(normalize_identifier("Figure").is_none());
        assert!(normalize_identifier("A.B").is_none());
    }

    #[test]
    fn test_unknown_names_are_accepted() {
        let id = normalize_identifier("F ROBNICATE -A LL").unwrap();
        assert_eq!(id.as_str(), "FROBNICATE-ALL");
    }

    #[test]
    fn test_identifier_words() {
        let id = Identifier::parse("DFS-VISIT").unwrap();
        assert_eq!(id.words().collect::<Vec<_>>(), vec!["DFS", "VISIT"]);
        assert!(Identifier::parse("DFS VISIT").is_none());
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let json = serde_json::to_string(&Identifier::parse("BFS").unwrap()).unwrap();
        assert_eq!(json, "\"BFS\"");
        assert!(serde_json::from_str::<Identifier>("\"bad name\"").is_err());
    }
}
