//! Book configuration: the read-only tables injected into the pipeline.
//!
//! A configuration is loaded once (from JSON, or the bundled default) and then
//! shared by reference across all page workers.
//!
//! ```json
//! {
//!   "title": "Introduction to Algorithms, Third Edition",
//!   "totalPages": 1313,
//!   "frontMatter": { "first": 1, "last": 5 },
//!   "backMatterStart": 1136,
//!   "chapters": { "22": "Elementary Graph Algorithms" },
//!   "sectionRanges": [{ "section": "22.2", "first": 595, "last": 603 }],
//!   "pageOverrides": { "594": "22.2" },
//!   "vocabulary": { "BFS": "Breadth-first search, O(V+E)" }
//! }
//! ```

use crate::error::{Error, Result};
use crate::identifier::Identifier;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

/// Bundled configuration for the CLRS third edition page scans.
const BUILTIN_CONFIG: &str = include_str!("../data/clrs.json");

static RE_SECTION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Z]+(?:\.\d+)+$").unwrap());

/// Inclusive, 1-based page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl PageRange {
    /// Creates a new range.
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// Returns true if `page` lies inside the range.
    pub fn contains(&self, page: u32) -> bool {
        (self.first..=self.last).contains(&page)
    }

    fn validate(&self, what: &str) -> Result<()> {
        if self.first == 0 {
            return Err(Error::Config(format!("{what}: pages are 1-based, got 0")));
        }
        if self.first > self.last {
            return Err(Error::Config(format!(
                "{what}: inverted range {}..{}",
                self.first, self.last
            )));
        }
        Ok(())
    }
}

/// Page ranges that drive the position-based classifier rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookLayout {
    /// Pages always classified as front matter.
    pub front_matter: Option<PageRange>,
    /// First page where index/bibliography/appendix markers are honored.
    pub back_matter_start: Option<u32>,
}

impl BookLayout {
    /// Returns true if `page` is in the front-matter range.
    pub fn is_front_matter(&self, page: u32) -> bool {
        self.front_matter.is_some_and(|range| range.contains(page))
    }

    /// Returns true if `page` is at or past the back-matter start.
    pub fn is_back_matter(&self, page: u32) -> bool {
        self.back_matter_start.is_some_and(|start| page >= start)
    }
}

/// Section ranges as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRange {
    pub section: String,
    pub first: u32,
    pub last: u32,
}

/// Page to section id overrides, expanded from ranges on load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    pages: BTreeMap<u32, String>,
}

impl OverrideTable {
    /// Expands section ranges and single-page entries into a page map.
    ///
    /// Ranges may not claim a page for two different sections. Single-page
    /// entries are applied last and replace whatever a range assigned.
    pub fn build(ranges: &[SectionRange], singles: &BTreeMap<u32, String>) -> Result<Self> {
        let mut pages = BTreeMap::new();

        for range in ranges {
            validate_section_id(&range.section)?;
            let what = format!("section range {}", range.section);
            PageRange::new(range.first, range.last).validate(&what)?;

            for page in range.first..=range.last {
                if let Some(existing) = pages.insert(page, range.section.clone()) {
                    if existing != range.section {
                        return Err(Error::Config(format!(
                            "page {page} claimed by sections {existing} and {}",
                            range.section
                        )));
                    }
                }
            }
        }

        for (&page, section) in singles {
            if page == 0 {
                return Err(Error::Config("page override: pages are 1-based, got 0".into()));
            }
            validate_section_id(section)?;
            pages.insert(page, section.clone());
        }

        Ok(Self { pages })
    }

    /// Returns the section id configured for `page`.
    pub fn section_for(&self, page: u32) -> Option<&str> {
        self.pages.get(&page).map(String::as_str)
    }

    /// Number of pages with an override.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if no page is overridden.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates over `(page, section)` pairs in page order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.pages.iter().map(|(page, section)| (*page, section.as_str()))
    }
}

fn validate_section_id(section: &str) -> Result<()> {
    if RE_SECTION_ID.is_match(section) {
        Ok(())
    } else {
        Err(Error::Config(format!("invalid section id {section:?}")))
    }
}

/// Known algorithm names with one-line descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    entries: BTreeMap<Identifier, String>,
}

impl Vocabulary {
    /// Returns the description of a known identifier.
    pub fn describe(&self, name: &Identifier) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Returns true if the identifier is known.
    pub fn contains(&self, name: &Identifier) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over known names in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &str)> {
        self.entries.iter().map(|(name, desc)| (name, desc.as_str()))
    }
}

/// Wire form of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBookConfig {
    title: String,
    authors: Vec<String>,
    total_pages: Option<u32>,
    front_matter: Option<PageRange>,
    back_matter_start: Option<u32>,
    chapters: BTreeMap<u32, String>,
    section_ranges: Vec<SectionRange>,
    page_overrides: BTreeMap<u32, String>,
    vocabulary: BTreeMap<String, String>,
}

/// Validated, read-only book configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookConfig {
    title: String,
    authors: Vec<String>,
    total_pages: Option<u32>,
    layout: BookLayout,
    chapters: BTreeMap<u32, String>,
    overrides: OverrideTable,
    vocabulary: Vocabulary,
}

impl BookConfig {
    /// Returns the bundled configuration.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CONFIG)
    }

    /// Loads a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            overrides = config.overrides.len(),
            vocabulary = config.vocabulary.len(),
            "loaded book configuration"
        );
        Ok(config)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawBookConfig = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawBookConfig) -> Result<Self> {
        if let Some(range) = &raw.front_matter {
            range.validate("front matter")?;
        }
        if raw.total_pages == Some(0) {
            return Err(Error::Config("totalPages must be positive".into()));
        }

        let overrides = OverrideTable::build(&raw.section_ranges, &raw.page_overrides)?;

        let mut entries = BTreeMap::new();
        for (name, description) in raw.vocabulary {
            let id = Identifier::try_from(name).map_err(Error::Config)?;
            entries.insert(id, description);
        }

        Ok(Self {
            title: raw.title,
            authors: raw.authors,
            total_pages: raw.total_pages,
            layout: BookLayout {
                front_matter: raw.front_matter,
                back_matter_start: raw.back_matter_start,
            },
            chapters: raw.chapters,
            overrides,
            vocabulary: Vocabulary { entries },
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Declared page count, if any.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn layout(&self) -> &BookLayout {
        &self.layout
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Returns the title of chapter `number`.
    pub fn chapter_title(&self, number: u32) -> Option<&str> {
        self.chapters.get(&number).map(String::as_str)
    }

    /// Number of chapters with a known title.
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Sets the declared page count.
    pub fn with_total_pages(mut self, pages: u32) -> Self {
        self.total_pages = Some(pages);
        self
    }
}
