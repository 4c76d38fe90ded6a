//! Page record assembly.
//!
//! Runs every extractor over one normalized page and merges the results with the
//! book configuration. Assembly never fails; anything not found is absent.

use crate::algorithm::{extract_algorithms, AlgorithmBlock};
use crate::claim::{extract_claims, Claim};
use crate::classify::{classify, PageType};
use crate::cleanup::PageText;
use crate::complexity::{extract_complexity, ComplexityToken};
use crate::config::BookConfig;
use crate::options::PipelineOptions;
use crate::structure::{chapter_of_section, locate, StructureSignals};
use serde::Serialize;

/// Maximum display title length taken from a page's first line.
const MAX_LINE_TITLE_CHARS: usize = 80;

/// Minimum length of a line used as a fallback title.
const MIN_LINE_TITLE_CHARS: usize = 4;

/// Where the section/chapter labels of a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSource {
    /// The override table assigned the section.
    Override,
    /// The structural locator found a chapter or section.
    Detected,
    /// No label.
    None,
}

/// An extracted algorithm with its vocabulary description, if known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmEntry {
    #[serde(flatten)]
    pub block: AlgorithmBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The structured record for one page. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    page_number: u32,
    #[serde(rename = "type")]
    page_type: PageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    chapter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    section_title: Option<String>,
    title: String,
    label_source: LabelSource,
    algorithms: Vec<AlgorithmEntry>,
    claims: Vec<Claim>,
    complexity_tokens: Vec<ComplexityToken>,
    #[serde(skip_serializing_if = "is_false")]
    empty: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PageRecord {
    /// Minimal record for a page whose input is missing.
    pub fn missing(page_number: u32) -> Self {
        Self {
            page_number,
            page_type: PageType::Content,
            chapter: None,
            section: None,
            section_title: None,
            title: format!("Page {page_number}"),
            label_source: LabelSource::None,
            algorithms: Vec::new(),
            claims: Vec::new(),
            complexity_tokens: Vec::new(),
            empty: true,
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_type(&self) -> PageType {
        self.page_type
    }

    pub fn chapter(&self) -> Option<u32> {
        self.chapter
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// Section title as printed in the page heading.
    pub fn section_title(&self) -> Option<&str> {
        self.section_title.as_deref()
    }

    /// Display title used by the manifest.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn label_source(&self) -> LabelSource {
        self.label_source
    }

    pub fn algorithms(&self) -> &[AlgorithmEntry] {
        &self.algorithms
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn complexity_tokens(&self) -> &[ComplexityToken] {
        &self.complexity_tokens
    }

    /// True when the record stands in for a missing input file.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// True when anything was extracted from the page.
    pub fn has_content(&self) -> bool {
        !self.empty
            && (!self.algorithms.is_empty()
                || !self.claims.is_empty()
                || !self.complexity_tokens.is_empty()
                || self.section.is_some())
    }

    /// Serializes the record as pretty JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Normalizes raw page text and assembles its record.
pub fn assemble(
    page_number: u32,
    raw: &str,
    config: &BookConfig,
    options: &PipelineOptions,
) -> PageRecord {
    let page = PageText::new(raw);
    assemble_page(page_number, &page, config, options)
}

/// Assembles the record of an already normalized page.
pub fn assemble_page(
    page_number: u32,
    page: &PageText,
    config: &BookConfig,
    options: &PipelineOptions,
) -> PageRecord {
    let signals = locate(page, options.head_window);
    let page_type = classify(page_number, page, &signals, config.layout());
    let labels = resolve_labels(page_number, &signals, config);
    let title = display_title(page_number, page, page_type, &labels, config);

    let algorithms: Vec<AlgorithmEntry> = extract_algorithms(page, &options.identifier)
        .into_iter()
        .map(|block| AlgorithmEntry {
            description: config
                .vocabulary()
                .describe(&block.name)
                .map(str::to_string),
            block,
        })
        .collect();
    let claims = extract_claims(page, options.statement_cap);
    let complexity_tokens = extract_complexity(page, options.max_argument_chars);

    tracing::debug!(
        page = page_number,
        page_type = %page_type,
        section = labels.section.as_deref().unwrap_or("-"),
        algorithms = algorithms.len(),
        claims = claims.len(),
        tokens = complexity_tokens.len(),
        "assembled page"
    );

    PageRecord {
        page_number,
        page_type,
        chapter: labels.chapter,
        section: labels.section,
        section_title: labels.section_title,
        title,
        label_source: labels.source,
        algorithms,
        claims,
        complexity_tokens,
        empty: false,
    }
}

/// Chapter and section labels after override resolution.
struct Labels {
    chapter: Option<u32>,
    section: Option<String>,
    section_title: Option<String>,
    source: LabelSource,
    /// The override, if any, agrees with the detected heading.
    confirmed: bool,
}

fn resolve_labels(page_number: u32, signals: &StructureSignals, config: &BookConfig) -> Labels {
    let detected = signals.section.as_ref();

    if let Some(section) = config.overrides().section_for(page_number) {
        let heading = detected.filter(|heading| heading.id == section);
        return Labels {
            chapter: chapter_of_section(section).or_else(|| signals.chapter()),
            section: Some(section.to_string()),
            section_title: heading.map(|h| h.title.clone()),
            source: LabelSource::Override,
            confirmed: heading.is_some(),
        };
    }

    let source = if signals.chapter().is_some() {
        LabelSource::Detected
    } else {
        LabelSource::None
    };

    Labels {
        chapter: signals.chapter(),
        section: detected.map(|h| h.id.clone()),
        section_title: detected.map(|h| h.title.clone()),
        source,
        confirmed: detected.is_some(),
    }
}

fn display_title(
    page_number: u32,
    page: &PageText,
    page_type: PageType,
    labels: &Labels,
    config: &BookConfig,
) -> String {
    match page_type {
        PageType::Toc => return "Table of Contents".to_string(),
        PageType::Preface => return "Preface".to_string(),
        PageType::Index => return "Index".to_string(),
        PageType::Bibliography => return "Bibliography".to_string(),
        _ => {}
    }

    if let Some(section) = &labels.section {
        return match (&labels.section_title, labels.confirmed) {
            (Some(title), true) => format!("{section} {title}"),
            _ => format!("Section {section}"),
        };
    }

    if let Some(chapter) = labels.chapter {
        return match config.chapter_title(chapter) {
            Some(title) => format!("{chapter}. {title}"),
            None => format!("Chapter {chapter}"),
        };
    }

    first_line_title(page).unwrap_or_else(|| format!("Page {page_number}"))
}

/// First line with a letter and at least a few characters, cut to length.
fn first_line_title(page: &PageText) -> Option<String> {
    page.lines()
        .map(str::trim)
        .find(|line| {
            line.chars().count() >= MIN_LINE_TITLE_CHARS && line.chars().any(char::is_alphabetic)
        })
        .map(|line| line.chars().take(MAX_LINE_TITLE_CHARS).collect())
}
