//! Page classification.
//!
//! # Priority Order
//!
//! 1. **Front matter** - page inside the configured front-matter range
//! 2. **Override** - labeling only, never changes the type
//! 3. **Navigation** - `Contents` (toc) or `Preface` near the top of the page
//! 4. **Back matter** - past the back-matter start with an `Index`,
//!    `Bibliography` or `Appendix` marker near the top
//! 5. **Exercises / Problems** - exercise numbering or a marker line
//! 6. **Chapter start** - explicit `Chapter N` marker
//! 7. **Content** - everything else

use crate::cleanup::PageText;
use crate::config::BookLayout;
use crate::structure::StructureSignals;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Window (in characters) searched for navigation and back-matter markers.
const MARKER_WINDOW: usize = 100;

static RE_CONTENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bContents\b").unwrap());
static RE_PREFACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bPreface\b").unwrap());
static RE_INDEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bIndex\b").unwrap());
static RE_BIBLIOGRAPHY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bBibliography\b").unwrap());
static RE_APPENDIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bAppendix\b").unwrap());
static RE_EXERCISES_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ ?Exercises$").unwrap());
static RE_PROBLEMS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ ?Problems$").unwrap());

/// Kind of page. Exactly one per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    FrontMatter,
    Toc,
    Preface,
    Index,
    Bibliography,
    Appendix,
    Exercises,
    Problems,
    ChapterStart,
    Content,
}

impl PageType {
    /// Stable lowercase name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::FrontMatter => "front_matter",
            PageType::Toc => "toc",
            PageType::Preface => "preface",
            PageType::Index => "index",
            PageType::Bibliography => "bibliography",
            PageType::Appendix => "appendix",
            PageType::Exercises => "exercises",
            PageType::Problems => "problems",
            PageType::ChapterStart => "chapter_start",
            PageType::Content => "content",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assigns a page type. Total: always returns exactly one type.
pub fn classify(
    page_number: u32,
    page: &PageText,
    signals: &StructureSignals,
    layout: &BookLayout,
) -> PageType {
    if layout.is_front_matter(page_number) {
        return PageType::FrontMatter;
    }

    let top = page.head(MARKER_WINDOW);

    if RE_CONTENTS.is_match(top) {
        return PageType::Toc;
    }
    if RE_PREFACE.is_match(top) {
        return PageType::Preface;
    }

    if layout.is_back_matter(page_number) {
        if RE_INDEX.is_match(top) {
            return PageType::Index;
        }
        if RE_BIBLIOGRAPHY.is_match(top) {
            return PageType::Bibliography;
        }
        if RE_APPENDIX.is_match(top) {
            return PageType::Appendix;
        }
    }

    if signals.exercise_numbering || RE_EXERCISES_LINE.is_match(page) {
        return PageType::Exercises;
    }
    if RE_PROBLEMS_LINE.is_match(page) {
        return PageType::Problems;
    }

    if signals.chapter_marker.is_some() {
        return PageType::ChapterStart;
    }

    PageType::Content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageRange;
    use crate::structure::{locate, DEFAULT_HEAD_WINDOW};

    fn layout() -> BookLayout {
        BookLayout {
            front_matter: Some(PageRange::new(1, 5)),
            back_matter_start: Some(1200),
        }
    }

    fn classify_text(page_number: u32, text: &str) -> PageType {
        let page = PageText::new(text);
        let signals = locate(&page, DEFAULT_HEAD_WINDOW);
        classify(page_number, &page, &signals, &layout())
    }

    #[test]
    fn test_front_matter_wins() {
        assert_eq!(classify_text(3, "Contents\nChapter 1"), PageType::FrontMatter);
        assert_eq!(classify_text(5, ""), PageType::FrontMatter);
    }

    #[test]
    fn test_toc_and_preface() {
        assert_eq!(classify_text(8, "Contents\n1 The Role of Algorithms 5"), PageType::Toc);
        assert_eq!(classify_text(20, "Preface\nBefore there were computers"), PageType::Preface);
    }

    #[test]
    fn test_toc_marker_must_be_near_top() {
        let text = format!("{}\nContents", "word ".repeat(40));
        assert_eq!(classify_text(8, &text), PageType::Content);
    }

    #[test]
    fn test_back_matter_requires_range() {
        assert_eq!(classify_text(1250, "Index\nabsolute value"), PageType::Index);
        assert_eq!(classify_text(1230, "Bibliography\n[1] Aho"), PageType::Bibliography);
        assert_eq!(classify_text(1210, "Appendix A Summations"), PageType::Appendix);
        assert_eq!(classify_text(300, "Index\nabsolute value"), PageType::Content);
    }

    #[test]
    fn test_exercises_and_problems() {
        assert_eq!(classify_text(400, "Exercises\n22.2-1\nShow"), PageType::Exercises);
        assert_eq!(classify_text(400, "22.2-1\nShow the d values"), PageType::Exercises);
        assert_eq!(classify_text(400, "Problems\n22-1 Classifying edges"), PageType::Problems);
    }

    #[test]
    fn test_exercises_beat_chapter_marker() {
        assert_eq!(
            classify_text(400, "Chapter 22 Elementary Graph Algorithms\nExercises"),
            PageType::Exercises
        );
    }

    #[test]
    fn test_chapter_start() {
        assert_eq!(
            classify_text(151, "Chapter 6 Heapsort\nIn this chapter"),
            PageType::ChapterStart
        );
    }

    #[test]
    fn test_section_page_is_content() {
        assert_eq!(
            classify_text(594, "22.2 Breadth-first search\nBFS(G, s)"),
            PageType::Content
        );
    }

    /// First matching rule for `text` on a page outside the front matter.
    fn expected_type(page_number: u32, text: &str) -> PageType {
        let back = page_number >= 1200;
        match text {
            "Contents\nIndex" => PageType::Toc,
            "Preface" => PageType::Preface,
            "Index" | "Index\nExercises" if back => PageType::Index,
            "Bibliography" if back => PageType::Bibliography,
            "Appendix A" | "Appendix A\nChapter 3" if back => PageType::Appendix,
            "Index\nExercises" | "22.2-1" | "Chapter 3\nExercises" => PageType::Exercises,
            "Problems" => PageType::Problems,
            "Chapter 3" | "Appendix A\nChapter 3" => PageType::ChapterStart,
            _ => PageType::Content,
        }
    }

    #[test]
    fn test_totality_over_page_range() {
        let texts = [
            "",
            "prose",
            "Contents\nIndex",
            "Preface",
            "Index",
            "Index\nExercises",
            "Bibliography",
            "Appendix A",
            "Appendix A\nChapter 3",
            "22.2-1",
            "Chapter 3\nExercises",
            "Problems",
            "Chapter 3",
        ];
        for page_number in 1..=1300 {
            for text in texts {
                let expected = if page_number <= 5 {
                    PageType::FrontMatter
                } else {
                    expected_type(page_number, text)
                };
                assert_eq!(
                    classify_text(page_number, text),
                    expected,
                    "page {page_number}, text {text:?}"
                );
            }
        }
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&PageType::ChapterStart).unwrap(),
            "\"chapter_start\""
        );
        assert_eq!(PageType::FrontMatter.to_string(), "front_matter");
    }
}
