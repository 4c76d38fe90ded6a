//! Structural locator: chapter markers, section headings and exercise numbering.
//!
//! All detectors look at the head of the page only, where running heads and
//! section starts live.

use crate::cleanup::PageText;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Default number of leading characters inspected by the locator.
pub const DEFAULT_HEAD_WINDOW: usize = 500;

static RE_CHAPTER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bChapter\s+(\d+)\b").unwrap());

static RE_SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ ?(\d+)\.(\d+) +([A-Za-z][\p{L}\p{N} ,:;'()\-]*)$").unwrap()
});

static RE_EXERCISE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ ?\d+\.\d+(?:-\d+|\.\d+)\b").unwrap());

/// A section heading such as `22.2 Breadth-first search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeading {
    /// Dotted section id, e.g. `22.2`.
    pub id: String,
    /// Chapter part of the id.
    pub chapter: u32,
    /// Heading text after the id.
    pub title: String,
}

/// Signals found at the head of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureSignals {
    /// Number from an explicit `Chapter N` marker.
    pub chapter_marker: Option<u32>,
    /// First section heading found at a line start.
    pub section: Option<SectionHeading>,
    /// An exercise number (`22.2-1` or `22.2.1`) starts a line.
    pub exercise_numbering: bool,
}

impl StructureSignals {
    /// Chapter this page belongs to: the explicit marker, else the chapter part
    /// of the section heading.
    pub fn chapter(&self) -> Option<u32> {
        self.chapter_marker
            .or_else(|| self.section.as_ref().map(|s| s.chapter))
    }

    /// Returns true if nothing structural was detected.
    pub fn is_empty(&self) -> bool {
        self.chapter_marker.is_none() && self.section.is_none() && !self.exercise_numbering
    }
}

/// Runs all structural detectors over the first `head_window` characters.
pub fn locate(page: &PageText, head_window: usize) -> StructureSignals {
    let head = page.head(head_window);

    StructureSignals {
        chapter_marker: detect_chapter_marker(head),
        section: detect_section(head),
        exercise_numbering: has_exercise_numbering(head),
    }
}

/// Finds a literal `Chapter <n>` marker.
pub fn detect_chapter_marker(text: &str) -> Option<u32> {
    RE_CHAPTER_MARKER
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Finds the first `<int>.<int> <Title>` line.
pub fn detect_section(text: &str) -> Option<SectionHeading> {
    RE_SECTION_HEADING.captures_iter(text).find_map(|caps| {
        let chapter: u32 = caps[1].parse().ok()?;
        let minor: u32 = caps[2].parse().ok()?;
        Some(SectionHeading {
            id: format!("{chapter}.{minor}"),
            chapter,
            title: caps[3].trim().to_string(),
        })
    })
}

/// Returns true if a line starts with an exercise number.
pub fn has_exercise_numbering(text: &str) -> bool {
    RE_EXERCISE_NUMBER.is_match(text)
}

/// Returns the chapter part of a dotted section id (`"22.2"` -> `22`).
pub fn chapter_of_section(section_id: &str) -> Option<u32> {
    section_id.split('.').next()?.trim().parse().ok()
}
